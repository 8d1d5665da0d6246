use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Agent types and model names provided by the runtime rather than by a file.
static BUILTIN_AGENTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // Runtime agent types
        "general-purpose",
        "explore",
        "plan",
        "statusline-setup",
        "output-style-setup",
        "claude-code-guide",
        // Model names
        "sonnet",
        "opus",
        "haiku",
        "inherit",
    ]
    .into_iter()
    .collect()
});

/// Built-in allow-list plus names added through configuration.
#[derive(Debug, Clone, Default)]
pub struct Builtins {
    extra: HashSet<String>,
}

impl Builtins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extra<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extra: names
                .into_iter()
                .map(Into::into)
                .filter(|name: &String| !name.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        BUILTIN_AGENTS.contains(name) || self.extra.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::is_reference_name;

    #[test]
    fn runtime_agents_and_models_are_builtin() {
        let builtins = Builtins::new();
        assert!(builtins.contains("general-purpose"));
        assert!(builtins.contains("haiku"));
        assert!(!builtins.contains("code-reviewer"));
    }

    #[test]
    fn configured_extras_extend_the_list() {
        let builtins = Builtins::with_extra(["team-bot", ""]);
        assert!(builtins.contains("team-bot"));
        assert!(!builtins.contains(""));
    }

    #[test]
    fn every_builtin_survives_name_filtering() {
        for name in BUILTIN_AGENTS.iter() {
            assert!(is_reference_name(name), "{name} can never be extracted");
        }
        assert!(!Builtins::new().contains("Explore"));
    }
}
