use std::collections::VecDeque;
use std::sync::Arc;

use crate::correlation::Correlation;
use crate::dashboard::{DashboardView, compute_view};
use crate::filter::{FilterCriteria, TeamFilter, next_team, prev_team};
use crate::player_stats::Dataset;

const MAX_LOGS: usize = 200;
pub const POINTS_STEP: u32 = 25;
pub const POINTS_BIG_STEP: u32 = 250;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Correlation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loaded,
    Failed(String),
}

#[derive(Debug)]
pub struct AppState {
    pub season: String,
    pub source_label: String,
    pub criteria: FilterCriteria,
    pub tab: Tab,
    pub load: LoadState,
    pub dataset: Option<Arc<Dataset>>,
    pub view: Option<DashboardView>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub leaderboard_selected: usize,
}

impl AppState {
    pub fn new(season: impl Into<String>, criteria: FilterCriteria) -> Self {
        Self {
            season: season.into(),
            source_label: String::new(),
            criteria,
            tab: Tab::Overview,
            load: LoadState::Idle,
            dataset: None,
            view: None,
            logs: VecDeque::new(),
            help_overlay: false,
            leaderboard_selected: 0,
        }
    }

    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.push_log(format!(
            "[INFO] Loaded {} players across {} teams for {}",
            dataset.len(),
            dataset.teams().len(),
            dataset.season()
        ));
        let missing_team = match &self.criteria.team {
            TeamFilter::Team(team) if !dataset.teams().contains(team) => Some(team.clone()),
            _ => None,
        };
        if let Some(team) = missing_team {
            self.push_log(format!("[WARN] Team {team} is not in this season's data"));
        }
        self.dataset = Some(dataset);
        self.load = LoadState::Loaded;
        self.recompute();
    }

    pub fn set_load_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.push_log(format!("[ERROR] Data retrieval failed: {message}"));
        self.push_log("[INFO] Press r to retry");
        self.load = LoadState::Failed(message);
    }

    /// Rebuild the derived view from the current dataset and criteria.
    pub fn recompute(&mut self) {
        let Some(dataset) = self.dataset.as_ref() else {
            self.view = None;
            return;
        };
        let view = compute_view(dataset, &self.criteria);
        if view.is_no_match() {
            self.push_log("[WARN] No rows match current filters");
        } else if let Correlation::Undefined(reason) = &view.correlation {
            self.push_log(format!("[INFO] Correlation {reason}"));
        }
        self.leaderboard_selected = self
            .leaderboard_selected
            .min(view.leaderboard.len().saturating_sub(1));
        self.view = Some(view);
    }

    pub fn raise_min_points(&mut self, step: u32) {
        let before = self.criteria.minimum_points();
        self.criteria.raise_minimum_points(step);
        if self.criteria.minimum_points() != before {
            self.recompute();
        }
    }

    pub fn lower_min_points(&mut self, step: u32) {
        let before = self.criteria.minimum_points();
        self.criteria.lower_minimum_points(step);
        if self.criteria.minimum_points() != before {
            self.recompute();
        }
    }

    pub fn cycle_team_next(&mut self) {
        let teams = self.team_options();
        self.criteria.team = next_team(&self.criteria.team, &teams);
        self.recompute();
    }

    pub fn cycle_team_prev(&mut self) {
        let teams = self.team_options();
        self.criteria.team = prev_team(&self.criteria.team, &teams);
        self.recompute();
    }

    pub fn reset_filters(&mut self) {
        self.criteria = FilterCriteria::default();
        self.push_log("[INFO] Filters reset");
        self.recompute();
    }

    pub fn toggle_tab(&mut self) {
        self.tab = match self.tab {
            Tab::Overview => Tab::Correlation,
            Tab::Correlation => Tab::Overview,
        };
    }

    pub fn select_next(&mut self) {
        let total = self.view.as_ref().map(|v| v.leaderboard.len()).unwrap_or(0);
        if total > 0 {
            self.leaderboard_selected = (self.leaderboard_selected + 1).min(total - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.leaderboard_selected = self.leaderboard_selected.saturating_sub(1);
    }

    pub fn team_options(&self) -> Vec<String> {
        self.dataset
            .as_ref()
            .map(|d| d.teams().to_vec())
            .unwrap_or_default()
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

pub fn tab_label(tab: Tab) -> &'static str {
    match tab {
        Tab::Overview => "Performance Overview",
        Tab::Correlation => "Advanced Correlation",
    }
}
