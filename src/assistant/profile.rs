use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Profile {
    #[default]
    Logistics,
    Teaching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarItemKind {
    Allowed,
    Denied,
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SidebarSection {
    pub title: Option<&'static str>,
    pub kind: SidebarItemKind,
    pub items: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sidebar {
    pub heading: &'static str,
    pub sections: &'static [SidebarSection],
    pub note: &'static str,
}

const LOGISTICS_SIDEBAR: Sidebar = Sidebar {
    heading: "What I Can Help With",
    sections: &[
        SidebarSection {
            title: Some("I can answer:"),
            kind: SidebarItemKind::Allowed,
            items: &[
                "When are assignments due?",
                "What's the late work policy?",
                "When are office hours?",
                "How much is the final worth?",
                "When is the midterm?",
                "How do I submit assignments?",
                "What's the attendance policy?",
            ],
        },
        SidebarSection {
            title: Some("I cannot help with:"),
            kind: SidebarItemKind::Denied,
            items: &[
                "Programming questions",
                "Homework problems",
                "Technical concepts",
                "Code debugging",
            ],
        },
    ],
    note: "For technical help, please attend office hours or use the course forum.",
};

const TEACHING_SIDEBAR: Sidebar = Sidebar {
    heading: "How to Use",
    sections: &[SidebarSection {
        title: None,
        kind: SidebarItemKind::Plain,
        items: &[
            "Ask about course policies",
            "Get help understanding concepts",
            "Clarify assignment requirements",
            "Review course schedule",
        ],
    }],
    note: "Note: I won't provide complete code solutions, but I'll help you understand the concepts!",
};

impl Profile {
    pub fn name(self) -> &'static str {
        match self {
            Self::Logistics => "logistics",
            Self::Teaching => "teaching",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Logistics => "Course Logistics Assistant",
            Self::Teaching => "Course Assistant",
        }
    }

    pub fn tagline(self) -> &'static str {
        match self {
            Self::Logistics => "Quick answers to syllabus, schedule, and policy questions",
            Self::Teaching => "Your AI teaching assistant for course questions and concept explanations",
        }
    }

    pub fn input_placeholder(self) -> &'static str {
        match self {
            Self::Logistics => "Ask about due dates, policies, office hours...",
            Self::Teaching => "Ask me about the course...",
        }
    }

    pub fn footer(self) -> &'static str {
        match self {
            Self::Logistics => {
                "This bot only answers logistics questions. For technical help, visit office hours."
            }
            Self::Teaching => "Remember: Learning happens through understanding, not copying!",
        }
    }

    pub fn sidebar(self) -> &'static Sidebar {
        match self {
            Self::Logistics => &LOGISTICS_SIDEBAR,
            Self::Teaching => &TEACHING_SIDEBAR,
        }
    }
}

impl Display for Profile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "logistics" => Ok(Self::Logistics),
            "teaching" => Ok(Self::Teaching),
            _ => Err(format!("unknown profile '{value}'")),
        }
    }
}
