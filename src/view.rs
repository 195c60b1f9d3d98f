use serde::Serialize;
use std::fmt;

/// Value of the selection control before anything is chosen.
pub const PLACEHOLDER: &str = "Select";
/// Selection value for the all-countries view.
pub const GLOBAL: &str = "Global";

/// Current value of the country selection control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Placeholder,
    Global,
    Country(String),
}

impl Selection {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" | PLACEHOLDER => Selection::Placeholder,
            GLOBAL => Selection::Global,
            other => Selection::Country(other.to_string()),
        }
    }

    /// Option list for the selection control: placeholder, `Global`, then every country.
    pub fn options(countries: &[String]) -> Vec<String> {
        let mut sorted = countries.to_vec();
        sorted.sort();
        sorted.dedup();

        let mut options = Vec::with_capacity(sorted.len() + 2);
        options.push(PLACEHOLDER.to_string());
        options.push(GLOBAL.to_string());
        options.extend(sorted);
        options
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Placeholder => f.write_str(PLACEHOLDER),
            Selection::Global => f.write_str(GLOBAL),
            Selection::Country(name) => f.write_str(name),
        }
    }
}

/// Which chart set one run produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", content = "country", rename_all = "snake_case")]
pub enum View {
    Global,
    Country(String),
    /// Nothing to plot yet: no country chosen, or `Global` chosen without the trigger.
    Unselected,
}

pub fn select_view(selection: &Selection, plot_requested: bool) -> View {
    match selection {
        Selection::Global if plot_requested => View::Global,
        Selection::Country(name) => View::Country(name.clone()),
        Selection::Global | Selection::Placeholder => View::Unselected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(Selection::parse("Select"), Selection::Placeholder);
        assert_eq!(Selection::parse(""), Selection::Placeholder);
        assert_eq!(Selection::parse("Global"), Selection::Global);
        assert_eq!(Selection::parse("Iraq"), Selection::Country("Iraq".to_string()));
    }

    #[test]
    fn test_options_order() {
        let countries = vec!["Peru".to_string(), "Iraq".to_string(), "Peru".to_string()];
        assert_eq!(Selection::options(&countries), vec!["Select", "Global", "Iraq", "Peru"]);
    }

    #[test]
    fn test_global_needs_trigger() {
        assert_eq!(select_view(&Selection::Global, true), View::Global);
        assert_eq!(select_view(&Selection::Global, false), View::Unselected);
    }

    #[test]
    fn test_country_ignores_trigger() {
        let iraq = Selection::Country("Iraq".to_string());
        assert_eq!(select_view(&iraq, true), View::Country("Iraq".to_string()));
        assert_eq!(select_view(&iraq, false), View::Country("Iraq".to_string()));
    }

    #[test]
    fn test_placeholder_is_unselected() {
        assert_eq!(select_view(&Selection::Placeholder, false), View::Unselected);
        assert_eq!(select_view(&Selection::Placeholder, true), View::Unselected);
    }
}
