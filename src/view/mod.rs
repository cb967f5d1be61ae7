pub mod models;

use std::fmt;

use crate::live::LiveRefreshController;
use crate::session::SessionCatalog;

pub use models::{ArchiveModel, LiveModel, LivePhase, OverviewModel, SessionDetail, SessionOption};

/// What the user picked in the navigation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NavSelection {
    Overview,
    Live,
    Category(String),
}

impl fmt::Display for NavSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavSelection::Overview => f.write_str("General Overview"),
            NavSelection::Live => f.write_str("Live"),
            NavSelection::Category(category) => f.write_str(category),
        }
    }
}

/// What gets displayed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum View {
    Overview,
    LiveMonitor(String),
    Archive(String),
}

/// Map a navigation choice to a view.
///
/// The live view needs a session to follow: the one the controller is already monitoring (or
/// showing the end of), else the live session of the catalog unless it already ended. Without one,
/// for instance because the race ended between two renders, the overview is shown instead.
pub fn select_view(
    selection: &NavSelection,
    catalog: &SessionCatalog,
    live: &LiveRefreshController,
) -> View {
    match selection {
        NavSelection::Overview => View::Overview,
        NavSelection::Category(category) => View::Archive(category.clone()),
        NavSelection::Live => {
            if let Some(session_id) = live.session_id() {
                return View::LiveMonitor(session_id.to_string());
            }
            match catalog.find_live() {
                Some(record) if !live.has_finished(&record.id) => {
                    View::LiveMonitor(record.id.clone())
                }
                _ => View::Overview,
            }
        }
    }
}

/// Navigation entries: overview, live, the configured categories, then any other category found
/// in the catalog.
pub fn nav_options(categories: &[String], catalog: &SessionCatalog) -> Vec<NavSelection> {
    let mut options = vec![NavSelection::Overview, NavSelection::Live];
    options.extend(categories.iter().cloned().map(NavSelection::Category));
    options.extend(
        catalog
            .distinct_types()
            .into_iter()
            .filter(|category| !categories.contains(category))
            .map(NavSelection::Category),
    );
    options
}
