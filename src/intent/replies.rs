//! Reply generators backed by live task data

use crate::error::AssistantError;
use crate::metrics::{self, Recommendation};
use crate::models::{Task, TaskStatus, Welcome};
use crate::Result;

use super::rules::ReplyContext;

pub fn greeting_for_hour(hour: u32) -> &'static str {
    if hour < 12 {
        "Good morning"
    } else if hour < 17 {
        "Good afternoon"
    } else {
        "Good evening"
    }
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

fn due_date_of(task: &Task) -> Result<chrono::DateTime<chrono::Utc>> {
    task.due_date.ok_or_else(|| {
        AssistantError::ReplyFailed(format!("task {} has no due date", task.id))
    })
}

pub fn greeting(ctx: &ReplyContext<'_>) -> Result<String> {
    let total = ctx.tasks.len();
    let pending = metrics::pending_count(ctx.tasks);

    let counts = if total > 0 {
        format!("You have **{} tasks** ({} pending). ", total, pending)
    } else {
        String::new()
    };

    Ok(format!(
        "{}! 👋 I'm your TaskFlow AI Assistant.\n\n{}I can tell you about your tasks, deadlines, priorities, and give productivity tips. What would you like to know?",
        greeting_for_hour(ctx.local_hour),
        counts
    ))
}

pub fn task_summary(ctx: &ReplyContext<'_>) -> Result<String> {
    let tasks = ctx.tasks;
    let total = tasks.len();

    if total == 0 {
        return Ok("📋 You don't have any tasks yet! Head to the **Tasks** page and click **+ New Task** to create your first one. I'll be here to help you track everything!".to_string());
    }

    let done = metrics::count_with_status(tasks, TaskStatus::Done);
    let in_progress = metrics::count_with_status(tasks, TaskStatus::InProgress);
    let todo = metrics::count_with_status(tasks, TaskStatus::Todo);
    let high = metrics::high_priority_pending(tasks).len();
    let overdue = metrics::overdue(tasks, ctx.now).len();
    let rate = metrics::completion_rate(tasks).round();

    let mut text = String::from("📊 **Your Task Summary:**\n");
    text.push_str(&format!("• **{} total tasks**\n", total));
    text.push_str(&format!("• ✅ **{}** completed ({}% done)\n", done, rate));
    text.push_str(&format!("• 🔄 **{}** in progress\n", in_progress));
    text.push_str(&format!("• 📝 **{}** still to do\n", todo));
    text.push_str(&format!("• 🔴 **{}** high-priority pending\n", high));
    if overdue > 0 {
        text.push_str(&format!("• ⚠️ **{} overdue**\n", plural(overdue, "task", "tasks")));
    }

    let encouragement = if rate >= 80.0 {
        "🎉 Amazing work! You're crushing it!"
    } else if rate >= 50.0 {
        "💪 Good progress! Keep the momentum going!"
    } else {
        "🚀 Let's pick up the pace — you've got this!"
    };
    text.push('\n');
    text.push_str(encouragement);

    Ok(text)
}

pub fn overdue_report(ctx: &ReplyContext<'_>) -> Result<String> {
    let overdue = metrics::overdue(ctx.tasks, ctx.now);

    if overdue.is_empty() {
        return Ok(
            "✅ Great news! You have **no overdue tasks**. Everything is on track! Keep it up! 🎯"
                .to_string(),
        );
    }

    let mut lines = Vec::with_capacity(ctx.list_limit);
    for task in overdue.iter().take(ctx.list_limit) {
        lines.push(format!(
            "• **{}** — was due {} ({} priority)",
            task.title,
            metrics::time_ago(due_date_of(task)?, ctx.now),
            task.priority
        ));
    }

    Ok(format!(
        "⚠️ **{} Overdue:**\n{}\n\n💡 I'd recommend tackling these first! Start with the highest priority ones.",
        plural(overdue.len(), "Task", "Tasks"),
        lines.join("\n")
    ))
}

pub fn upcoming_deadlines(ctx: &ReplyContext<'_>) -> Result<String> {
    let upcoming = metrics::upcoming(ctx.tasks, ctx.now, ctx.upcoming_window_days);

    if upcoming.is_empty() {
        return Ok(format!(
            "📅 No deadlines coming up in the next {} days. You're in the clear! Perfect time to plan ahead. 🧘",
            ctx.upcoming_window_days
        ));
    }

    let lines: Vec<String> = upcoming
        .iter()
        .take(ctx.list_limit)
        .map(|u| format!("• **{}** — {}", u.task.title, u.label))
        .collect();

    Ok(format!(
        "📅 **Upcoming Deadlines (next {} days):**\n{}\n\n⏰ Stay ahead — maybe knock one out right now?",
        ctx.upcoming_window_days,
        lines.join("\n")
    ))
}

pub fn high_priority_report(ctx: &ReplyContext<'_>) -> Result<String> {
    let high = metrics::high_priority_pending(ctx.tasks);

    if high.is_empty() {
        return Ok("🎉 No pending high-priority tasks! All critical work is done. Time to focus on medium and low priority items. 👏".to_string());
    }

    let lines: Vec<String> = high
        .iter()
        .take(ctx.list_limit)
        .map(|t| {
            let status = if t.status == TaskStatus::InProgress {
                "🔄 In Progress"
            } else {
                "📝 Todo"
            };
            format!("• **{}** — {}", t.title, status)
        })
        .collect();

    Ok(format!(
        "🔴 **{} Pending:**\n{}\n\n🎯 Focus on these first for maximum impact!",
        plural(high.len(), "High-Priority Task", "High-Priority Tasks"),
        lines.join("\n")
    ))
}

pub fn in_progress_report(ctx: &ReplyContext<'_>) -> Result<String> {
    let active = metrics::in_progress(ctx.tasks);

    if active.is_empty() {
        return Ok("🤔 You don't have any tasks **in progress** right now. Pick a task and start working on it! I recommend starting with high-priority items.".to_string());
    }

    let lines: Vec<String> = active
        .iter()
        .take(ctx.list_limit)
        .map(|t| {
            let logged = match t.time_spent {
                Some(hours) if hours > 0.0 => format!(" ({}h logged)", hours),
                _ => String::new(),
            };
            format!("• **{}**{} — {} priority", t.title, logged, t.priority)
        })
        .collect();

    Ok(format!(
        "🔄 **Currently In Progress ({}):**\n{}\n\n💪 Keep going! Focus on finishing one before starting another.",
        active.len(),
        lines.join("\n")
    ))
}

pub fn recent_activity(ctx: &ReplyContext<'_>) -> Result<String> {
    let recent = metrics::recent(ctx.tasks, ctx.list_limit);

    if recent.is_empty() {
        return Ok(
            "📭 No recent activity yet. Create your first task to get started!".to_string(),
        );
    }

    let lines: Vec<String> = recent
        .iter()
        .map(|t| {
            let icon = match t.status {
                TaskStatus::Done => "✅",
                TaskStatus::InProgress => "🔄",
                TaskStatus::Todo => "📝",
            };
            format!(
                "• {} **{}** — created {}",
                icon,
                t.title,
                metrics::time_ago(t.created_at, ctx.now)
            )
        })
        .collect();

    Ok(format!("📋 **Recent Activity:**\n{}", lines.join("\n")))
}

pub fn productivity_tips(ctx: &ReplyContext<'_>) -> Result<String> {
    let tasks = ctx.tasks;
    let total = tasks.len();
    let rate = metrics::completion_rate(tasks);
    let high_pending = metrics::high_priority_pending(tasks).len();
    let overdue = metrics::overdue(tasks, ctx.now).len();
    let in_progress = metrics::in_progress(tasks).len();

    let mut tips = Vec::new();

    if overdue > 0 {
        tips.push(format!(
            "⚠️ You have **{} overdue** task{}. Try the **2-minute rule** — if a task takes less than 2 minutes, do it now!",
            overdue,
            if overdue > 1 { "s" } else { "" }
        ));
    }
    if high_pending > 3 {
        tips.push(format!(
            "🔴 **{} high-priority tasks** are piling up. Use the **Eisenhower Matrix**: Urgent+Important → Do now, Important → Schedule, Urgent → Delegate, Neither → Drop.",
            high_pending
        ));
    }
    if rate < 30.0 && total > 5 {
        tips.push("📉 Your completion rate is low. Try **breaking big tasks into smaller ones** — each small win releases dopamine and builds momentum!".to_string());
    }
    if rate >= 80.0 {
        tips.push("🏆 Your completion rate is over 80%! You're on fire! Consider setting **stretch goals** to push yourself further.".to_string());
    }
    if in_progress > 3 {
        tips.push(format!(
            "🔄 You have **{} tasks in progress** simultaneously. Studies show focusing on **1–3 tasks at a time** leads to better results. Consider finishing some before starting new ones.",
            in_progress
        ));
    }

    if tips.is_empty() {
        tips.push("💡 **Pro Tip:** Try the **Pomodoro Technique** — work for 25 minutes, take a 5-minute break. After 4 cycles, take a longer break. It's proven to boost focus!".to_string());
    }

    Ok(format!("🧠 **Smart Insights:**\n\n{}", tips.join("\n\n")))
}

pub fn next_task(ctx: &ReplyContext<'_>) -> Result<String> {
    let text = match metrics::recommendation(ctx.tasks, ctx.now) {
        Recommendation::Overdue(task) => format!(
            "🚨 **Do this right now:** **{}**\nIt's overdue! Clear this one first and you'll feel so much better. You've got this! 💪",
            task.title
        ),
        Recommendation::HighPriority(task) => format!(
            "🎯 **I'd start with:** **{}**\nIt's high-priority and hasn't been started yet. Tackling it now will have the biggest impact!",
            task.title
        ),
        Recommendation::FinishInProgress(task) => format!(
            "🔄 **Finish what you started:** **{}**\nIt's already in progress — focus on completing it before starting anything new. One thing at a time! 🧠",
            task.title
        ),
        Recommendation::StartTodo(task) => format!(
            "📝 **Pick this one up:** **{}**\nIt's waiting for you! Start small, build momentum. 🚀",
            task.title
        ),
        Recommendation::AllClear => "🎉 **All caught up!** You have no pending tasks. Enjoy the free time or plan your next set of goals! 🏖️".to_string(),
    };

    Ok(text)
}

/// Opening message for a fresh chat session.
pub fn welcome(ctx: &ReplyContext<'_>) -> Welcome {
    let tasks = ctx.tasks;
    let pending = metrics::pending_count(tasks);
    let overdue = metrics::overdue(tasks, ctx.now).len();
    let high = metrics::high_priority_pending(tasks).len();

    let mut text = format!(
        "{}! 👋 I'm your **TaskFlow AI Assistant**.\n\n",
        greeting_for_hour(ctx.local_hour)
    );

    if tasks.is_empty() {
        text.push_str("You don't have any tasks yet. Create some from the **Tasks** page and I'll help you manage them!");
    } else {
        text.push_str(&format!(
            "📋 You have **{} tasks** — **{} pending**.\n",
            tasks.len(),
            pending
        ));
        if overdue > 0 {
            text.push_str(&format!(
                "⚠️ **{} overdue!**\n",
                if overdue > 1 {
                    format!("{} tasks are", overdue)
                } else {
                    "1 task is".to_string()
                }
            ));
        }
        if high > 0 {
            text.push_str(&format!(
                "🔴 **{} high-priority** task{} need{} attention.\n",
                high,
                if high > 1 { "s" } else { "" },
                if high == 1 { "s" } else { "" }
            ));
        }
        text.push_str("\nTap a quick action below or ask me anything!");
    }

    Welcome {
        text,
        urgent: overdue > 0 || high > 2,
    }
}
