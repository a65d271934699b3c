// ABOUTME: Minimal pane type for exercising the layout tree in tests.
// ABOUTME: Carries only an identity and a name.

use serde::{Deserialize, Serialize};
use wm_core::PaneId;

use crate::{PaneCodec, TreePane};

#[derive(Debug, Clone, PartialEq)]
pub struct TestPane {
    pub id: PaneId,
    pub name: String,
}

impl TestPane {
    pub fn named(name: &str) -> Self {
        Self {
            id: PaneId::fresh(),
            name: name.to_string(),
        }
    }
}

impl TreePane for TestPane {
    fn id(&self) -> PaneId {
        self.id
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn duplicate(&self, mark_as_copy: bool) -> Self {
        let name = if mark_as_copy {
            format!("{} Copy", self.name)
        } else {
            self.name.clone()
        };
        Self::named(&name)
    }

    fn placeholder() -> Self {
        Self::named("Empty")
    }
}

#[derive(Serialize, Deserialize)]
pub struct TestPaneState {
    pub name: String,
}

impl PaneCodec for TestPane {
    fn type_name(&self) -> &'static str {
        "test"
    }

    fn encode(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(TestPaneState {
            name: self.name.clone(),
        })
    }
}

pub fn decode_test_pane(value: serde_json::Value) -> Result<TestPane, serde_json::Error> {
    let state: TestPaneState = serde_json::from_value(value)?;
    Ok(TestPane::named(&state.name))
}
