//! Shared helpers for unit and integration tests
use std::env;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::{NodeHandle, NodeView, RenderBridge};
use crate::domain::TreeNodeData;

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "treemenu=trace");
        }
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Three-level sample document.
///
/// ```text
/// Portfolio
/// ├── 1 work  "A very very very long project title"
/// │   ├── 11 project "Alpha"
/// │   │   └── 111 release "v1"
/// │   └── 12 project "Beta"
/// └── 2 about "About"
/// ```
pub fn portfolio_tree() -> TreeNodeData {
    TreeNodeData::root(vec![
        TreeNodeData::new(1, "work", "A very very very long project title").with_children(vec![
            TreeNodeData::new(11, "project", "Alpha")
                .with_children(vec![TreeNodeData::new(111, "release", "v1")]),
            TreeNodeData::new(12, "project", "Beta"),
        ]),
        TreeNodeData::new(2, "about", "About"),
    ])
}

/// One entry per bridge call, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCall {
    Mount {
        parent: Option<NodeHandle>,
        position: usize,
        url: String,
    },
    Unmount(NodeHandle),
    Update { url: String },
}

/// [`RenderBridge`] that only records what it was asked to do.
#[derive(Debug, Default)]
pub struct RecordingBridge {
    pub calls: Vec<BridgeCall>,
}

impl RecordingBridge {
    pub fn mounted_urls(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                BridgeCall::Mount { url, .. } => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn unmount_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, BridgeCall::Unmount(_)))
            .count()
    }
}

impl RenderBridge for RecordingBridge {
    fn mount(&mut self, parent: Option<NodeHandle>, position: usize, view: &NodeView) {
        self.calls.push(BridgeCall::Mount {
            parent,
            position,
            url: view.url.clone(),
        });
    }

    fn unmount(&mut self, node: NodeHandle) {
        self.calls.push(BridgeCall::Unmount(node));
    }

    fn update(&mut self, view: &NodeView) {
        self.calls.push(BridgeCall::Update {
            url: view.url.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_sample_tree_when_walking_then_has_all_records() {
        init_test_setup();
        let tree = portfolio_tree();
        assert_eq!(tree.walk().len(), 6);
    }
}
