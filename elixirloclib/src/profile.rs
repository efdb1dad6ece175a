//! Built-in quality profiles.
//!
//! The Elixir support ships a single default profile. It activates no rules;
//! it exists so the host has a profile to attach Elixir projects to.

use serde::Serialize;

use crate::language::Elixir;

/// A rule switched on in a quality profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveRule {
    pub repository: String,
    pub key: String,
}

/// A quality profile registered by a language plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuiltInQualityProfile {
    pub name: String,
    pub language: String,
    pub default: bool,
    pub rules: Vec<ActiveRule>,
}

impl BuiltInQualityProfile {
    pub fn new(name: &str, language: &str) -> Self {
        Self {
            name: name.to_string(),
            language: language.to_string(),
            default: false,
            rules: Vec::new(),
        }
    }

    pub fn set_default(&mut self, default: bool) -> &mut Self {
        self.default = default;
        self
    }

    pub fn activate_rule(&mut self, repository: &str, key: &str) -> &mut Self {
        self.rules.push(ActiveRule {
            repository: repository.to_string(),
            key: key.to_string(),
        });
        self
    }
}

/// Collects the profiles defined by plugins.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfilesContext {
    profiles: Vec<BuiltInQualityProfile>,
}

impl ProfilesContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new built-in profile and return it for further setup.
    pub fn create_built_in_quality_profile(
        &mut self,
        name: &str,
        language: &str,
    ) -> &mut BuiltInQualityProfile {
        self.profiles.push(BuiltInQualityProfile::new(name, language));
        let last = self.profiles.len() - 1;
        &mut self.profiles[last]
    }

    pub fn profile(&self, language: &str, name: &str) -> Option<&BuiltInQualityProfile> {
        self.profiles
            .iter()
            .find(|p| p.language == language && p.name == name)
    }

    pub fn profiles_by_language<'a>(
        &'a self,
        language: &'a str,
    ) -> impl Iterator<Item = &'a BuiltInQualityProfile> + 'a {
        self.profiles.iter().filter(move |p| p.language == language)
    }

    pub fn profiles(&self) -> &[BuiltInQualityProfile] {
        &self.profiles
    }
}

/// Implemented by plugins that contribute built-in profiles.
pub trait QualityProfilesDefinition {
    fn define(&self, context: &mut ProfilesContext);
}

/// The default Elixir profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElixirQualityProfile;

impl ElixirQualityProfile {
    pub const DEFAULT_PROFILE: &'static str = "Sonar way";
}

impl QualityProfilesDefinition for ElixirQualityProfile {
    fn define(&self, context: &mut ProfilesContext) {
        context
            .create_built_in_quality_profile(Self::DEFAULT_PROFILE, Elixir::KEY)
            .set_default(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defined() -> ProfilesContext {
        let mut context = ProfilesContext::new();
        ElixirQualityProfile.define(&mut context);
        context
    }

    #[test]
    fn test_defines_one_profile() {
        let context = defined();

        assert_eq!(context.profiles().len(), 1);
        assert_eq!(context.profiles_by_language("elixir").count(), 1);
    }

    #[test]
    fn test_profile_is_default_without_rules() {
        let context = defined();
        let profile = context.profile("elixir", "Sonar way").unwrap();

        assert!(profile.default);
        assert_eq!(profile.rules.len(), 0);
    }

    #[test]
    fn test_lookup_other_language() {
        let context = defined();

        assert!(context.profile("erlang", "Sonar way").is_none());
        assert_eq!(context.profiles_by_language("erlang").count(), 0);
    }

    #[test]
    fn test_activate_rule() {
        let mut context = ProfilesContext::new();
        context
            .create_built_in_quality_profile("Strict", "elixir")
            .activate_rule("credo", "Credo.Check.Readability.ModuleDoc");

        let profile = context.profile("elixir", "Strict").unwrap();
        assert!(!profile.default);
        assert_eq!(profile.rules.len(), 1);
        assert_eq!(profile.rules[0].repository, "credo");
    }
}
