/// The designer using this session. Built once in `main` and handed to the
/// app; nothing reads it from the environment after startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Designer {
    name: String,
}

impl Designer {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Explicit name if given, else `$USER`/`$USERNAME`, else "designer".
    pub fn resolve(explicit: Option<String>) -> Self {
        let name = explicit
            .filter(|n| !n.trim().is_empty())
            .or_else(|| std::env::var("USER").ok())
            .or_else(|| std::env::var("USERNAME").ok())
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "designer".to_string());
        Self::new(name.trim())
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
