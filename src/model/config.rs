use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Configuration from tally.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TallyConfig {
    #[serde(default)]
    pub ui: UiConfig,
    /// Categories in display order, each with its subcategories
    #[serde(default)]
    pub categories: IndexMap<String, CategoryConfig>,
    #[serde(default)]
    pub accounts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub show_key_hints: bool,
    #[serde(default)]
    pub colors: HashMap<String, String>,
    /// Two clicks closer than this count as a double-click
    #[serde(default = "default_double_click_ms")]
    pub double_click_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            show_key_hints: true,
            colors: HashMap::new(),
            double_click_ms: default_double_click_ms(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_double_click_ms() -> u64 {
    400
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Color hint: a theme color name or `#RRGGBB`
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub subcategories: Vec<String>,
    /// Still shown on old movements but no longer selectable
    #[serde(default)]
    pub archived: bool,
}

impl TallyConfig {
    pub fn subcategories(&self, category: &str) -> &[String] {
        self.categories
            .get(category)
            .map_or(&[], |c| c.subcategories.as_slice())
    }
}
