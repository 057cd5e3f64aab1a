//! UI-adjacent view state held next to the document.
//!
//! All fields are plain direct writes except one coupling: selecting a block
//! opens the inspector on the block configuration tab, and clearing the
//! selection falls back to the styles tab.

use serde::{Deserialize, Serialize};

/// Active tab of the inspector side panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SidebarTab {
    #[default]
    Styles,
    BlockConfiguration,
}

/// Active tab of the main canvas area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MainTab {
    #[default]
    Editor,
    Preview,
    Json,
    Html,
}

/// Canvas size preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScreenSize {
    #[default]
    Desktop,
    Mobile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub sidebar_tab: SidebarTab,
    pub main_tab: MainTab,
    pub screen_size: ScreenSize,
    pub inspector_open: bool,
    pub samples_drawer_open: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            sidebar_tab: SidebarTab::Styles,
            main_tab: MainTab::Editor,
            screen_size: ScreenSize::Desktop,
            inspector_open: true,
            samples_drawer_open: true,
        }
    }
}

impl ViewState {
    /// Apply the selection coupling rule
    pub fn on_selection_changed(&mut self, selected: bool) {
        if selected {
            self.sidebar_tab = SidebarTab::BlockConfiguration;
            self.inspector_open = true;
        } else {
            self.sidebar_tab = SidebarTab::Styles;
        }
    }

    pub fn set_sidebar_tab(&mut self, tab: SidebarTab) {
        self.sidebar_tab = tab;
    }

    pub fn set_main_tab(&mut self, tab: MainTab) {
        self.main_tab = tab;
    }

    pub fn set_screen_size(&mut self, size: ScreenSize) {
        self.screen_size = size;
    }

    pub fn toggle_inspector(&mut self) {
        self.inspector_open = !self.inspector_open;
    }

    pub fn toggle_samples_drawer(&mut self) {
        self.samples_drawer_open = !self.samples_drawer_open;
    }
}
