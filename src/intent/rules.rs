//! Rule table
//!
//! Each rule pairs an enumerated `RuleId` with its trigger phrases and a
//! responder. Table order only matters for breaking score ties.

use chrono::{DateTime, Utc};
use std::fmt;

use super::replies;
use crate::models::Task;
use crate::Result;

/// Everything a responder may read while composing a reply.
#[derive(Debug, Clone, Copy)]
pub struct ReplyContext<'a> {
    pub tasks: &'a [Task],
    pub now: DateTime<Utc>,
    /// Hour of day in the user's local time, for greetings
    pub local_hour: u32,
    pub upcoming_window_days: i64,
    pub list_limit: usize,
}

pub type Generator = fn(&ReplyContext<'_>) -> Result<String>;

#[derive(Clone, Copy)]
pub enum Responder {
    Static(&'static str),
    Generate(Generator),
}

impl Responder {
    pub fn produce(&self, ctx: &ReplyContext<'_>) -> Result<String> {
        match self {
            Responder::Static(text) => Ok((*text).to_string()),
            Responder::Generate(generate) => generate(ctx),
        }
    }
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Responder::Static(_) => write!(f, "Responder::Static"),
            Responder::Generate(_) => write!(f, "Responder::Generate"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleId {
    Greeting,
    TaskSummary,
    Overdue,
    Deadlines,
    HighPriority,
    InProgress,
    RecentActivity,
    ProductivityTips,
    NextTask,
    AboutProject,
    TechStack,
    Backend,
    Frontend,
    Database,
    Auth,
    Deployment,
    Help,
    Farewell,
}

impl RuleId {
    /// Built-in table order
    pub const ALL: [RuleId; 18] = [
        RuleId::Greeting,
        RuleId::TaskSummary,
        RuleId::Overdue,
        RuleId::Deadlines,
        RuleId::HighPriority,
        RuleId::InProgress,
        RuleId::RecentActivity,
        RuleId::ProductivityTips,
        RuleId::NextTask,
        RuleId::AboutProject,
        RuleId::TechStack,
        RuleId::Backend,
        RuleId::Frontend,
        RuleId::Database,
        RuleId::Auth,
        RuleId::Deployment,
        RuleId::Help,
        RuleId::Farewell,
    ];

    pub fn triggers(self) -> &'static [&'static str] {
        match self {
            RuleId::Greeting => &[
                "hello",
                "hi",
                "hey",
                "greetings",
                "good morning",
                "good evening",
                "good afternoon",
            ],
            RuleId::TaskSummary => &[
                "my tasks",
                "task summary",
                "how many tasks",
                "task count",
                "summary",
                "overview",
                "show tasks",
                "status",
            ],
            RuleId::Overdue => &["overdue", "late", "missed", "past due", "expired"],
            RuleId::Deadlines => &[
                "deadline",
                "due",
                "upcoming",
                "due soon",
                "due date",
                "schedule",
                "calendar",
            ],
            RuleId::HighPriority => &[
                "high priority",
                "important",
                "urgent",
                "critical",
                "priority",
            ],
            RuleId::InProgress => &["in progress", "working on", "active", "current", "doing"],
            RuleId::RecentActivity => &[
                "recent",
                "latest",
                "activity",
                "new tasks",
                "last created",
            ],
            RuleId::ProductivityTips => &[
                "tip",
                "advice",
                "productivity",
                "suggest",
                "recommendation",
                "insight",
                "improve",
            ],
            RuleId::NextTask => &[
                "what should i do",
                "what next",
                "suggest task",
                "what to do",
                "recommend",
                "which task",
                "start with",
            ],
            RuleId::AboutProject => &[
                "what is taskflow",
                "about project",
                "what is this",
                "about this app",
                "tell me about",
            ],
            RuleId::TechStack => &[
                "tech stack",
                "technology",
                "tools used",
                "built with",
                "framework",
            ],
            RuleId::Backend => &["backend", "fastapi", "python", "server", "api"],
            RuleId::Frontend => &["frontend", "react", "typescript", "vite", "ui"],
            RuleId::Database => &["database", "postgresql", "sql", "sqlalchemy", "db", "schema"],
            RuleId::Auth => &["auth", "authentication", "login", "jwt", "token", "register"],
            RuleId::Deployment => &["docker", "container", "deploy", "compose"],
            RuleId::Help => &["help", "what can you do", "features", "commands", "menu"],
            RuleId::Farewell => &["bye", "goodbye", "thanks", "thank you"],
        }
    }

    pub fn responder(self) -> Responder {
        match self {
            RuleId::Greeting => Responder::Generate(replies::greeting),
            RuleId::TaskSummary => Responder::Generate(replies::task_summary),
            RuleId::Overdue => Responder::Generate(replies::overdue_report),
            RuleId::Deadlines => Responder::Generate(replies::upcoming_deadlines),
            RuleId::HighPriority => Responder::Generate(replies::high_priority_report),
            RuleId::InProgress => Responder::Generate(replies::in_progress_report),
            RuleId::RecentActivity => Responder::Generate(replies::recent_activity),
            RuleId::ProductivityTips => Responder::Generate(replies::productivity_tips),
            RuleId::NextTask => Responder::Generate(replies::next_task),
            RuleId::AboutProject => Responder::Static(ABOUT_PROJECT),
            RuleId::TechStack => Responder::Static(TECH_STACK),
            RuleId::Backend => Responder::Static(BACKEND),
            RuleId::Frontend => Responder::Static(FRONTEND),
            RuleId::Database => Responder::Static(DATABASE),
            RuleId::Auth => Responder::Static(AUTH),
            RuleId::Deployment => Responder::Static(DEPLOYMENT),
            RuleId::Help => Responder::Static(HELP),
            RuleId::Farewell => Responder::Static(FAREWELL),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RuleId::Greeting => "greeting",
            RuleId::TaskSummary => "task_summary",
            RuleId::Overdue => "overdue",
            RuleId::Deadlines => "deadlines",
            RuleId::HighPriority => "high_priority",
            RuleId::InProgress => "in_progress",
            RuleId::RecentActivity => "recent_activity",
            RuleId::ProductivityTips => "productivity_tips",
            RuleId::NextTask => "next_task",
            RuleId::AboutProject => "about_project",
            RuleId::TechStack => "tech_stack",
            RuleId::Backend => "backend",
            RuleId::Frontend => "frontend",
            RuleId::Database => "database",
            RuleId::Auth => "auth",
            RuleId::Deployment => "deployment",
            RuleId::Help => "help",
            RuleId::Farewell => "farewell",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub id: RuleId,
    pub triggers: &'static [&'static str],
    pub responder: Responder,
}

impl Rule {
    pub fn new(id: RuleId, triggers: &'static [&'static str], responder: Responder) -> Self {
        Self {
            id,
            triggers,
            responder,
        }
    }

    pub fn builtin(id: RuleId) -> Self {
        Self::new(id, id.triggers(), id.responder())
    }

    /// Sum of word counts of every trigger phrase contained in `normalized`.
    ///
    /// Plain substring containment, no word boundaries: "hi" also hits
    /// inside "this".
    pub fn score(&self, normalized: &str) -> usize {
        self.triggers
            .iter()
            .filter(|phrase| normalized.contains(**phrase))
            .map(|phrase| phrase.split(' ').count())
            .sum()
    }
}

/// Ordered rule set
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn builtin() -> Self {
        Self::new(RuleId::ALL.iter().copied().map(Rule::builtin).collect())
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Highest-scoring rule; the earliest rule wins a tie. `None` when
    /// nothing scores above zero.
    pub fn best_match(&self, normalized: &str) -> Option<(&Rule, usize)> {
        let mut best: Option<(&Rule, usize)> = None;

        for rule in &self.rules {
            let score = rule.score(normalized);
            let best_score = best.map_or(0, |(_, s)| s);
            if score > best_score {
                best = Some((rule, score));
            }
        }

        best
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::builtin()
    }
}

//
// ================= Static Replies =================
//

const ABOUT_PROJECT: &str = "TaskFlow is a full-stack task management system built with **FastAPI** (Python backend) and **React + TypeScript** (frontend). It features user authentication, task CRUD, file attachments, comments, real-time WebSocket updates, and an analytics dashboard.";

const TECH_STACK: &str = "🛠️ **Tech Stack:**\n• **Backend:** FastAPI (Python), SQLAlchemy, PostgreSQL\n• **Frontend:** React 18, TypeScript, Vite\n• **Auth:** JWT (python-jose + bcrypt)\n• **Charts:** Recharts\n• **Icons:** Lucide React\n• **Real-time:** WebSockets\n• **Deploy:** Docker + Docker Compose\n• **Styling:** CSS Variables (dark/light themes)";

const BACKEND: &str = "The backend is **FastAPI** (Python):\n• RESTful endpoints for tasks, users, comments, attachments\n• **SQLAlchemy** ORM + PostgreSQL\n• JWT authentication\n• File uploads & analytics endpoints\n• WebSocket server for real-time updates";

const FRONTEND: &str = "Frontend: **React 18 + TypeScript + Vite**\n• Component-based architecture\n• React Router + Context API\n• Recharts for visualization\n• CSS Variables for theming\n• Responsive design";

const DATABASE: &str = "**PostgreSQL** via SQLAlchemy ORM:\n• **Users** (id, email, full_name, hashed_password)\n• **Tasks** (id, title, description, status, priority, due_date, time_spent)\n• **Comments** (id, content, task_id, user_id)\n• **Attachments** (id, filename, file_path, task_id)";

const AUTH: &str = "Auth uses **JWT tokens**:\n• Login returns access token → stored in localStorage\n• PrivateRoute protects authenticated pages\n• python-jose validates tokens on backend\n• Passwords hashed with bcrypt";

const DEPLOYMENT: &str = "🐳 **Docker deployment:**\n• 3 services: frontend (Nginx), backend (uvicorn), database (PostgreSQL)\n• Run: `docker-compose up --build`";

const HELP: &str = "Here's what I can do:\n\n📊 **Live Task Data:**\n• \"my tasks\" — Task summary & stats\n• \"overdue\" — Overdue task alerts\n• \"deadlines\" — Upcoming due dates\n• \"high priority\" — Critical tasks\n• \"in progress\" — Active work\n• \"recent\" — Latest activity\n• \"what should I do\" — Smart recommendation\n• \"tips\" — Productivity advice\n\n📖 **Project Info:**\n• \"tech stack\" — Technologies used\n• \"about\" — Project overview\n• \"database\" — Schema details\n• \"auth\" — Login flow";

const FAREWELL: &str = "You're welcome! 😊 Keep crushing those tasks. I'm always here if you need help! 🚀";
