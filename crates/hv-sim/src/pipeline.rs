//! Post-processing pipelines applied to every solved time slice.

use hv_core::{HarvesterState, StateIndex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub type PipelineFn = Arc<dyn Fn(HarvesterState) -> HarvesterState + Send + Sync>;

/// A transform from one state to another of the same shape.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Pipeline {
    /// Clamp one component into `[min, max]`; a missing bound is open.
    Clip {
        component: StateIndex,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    #[serde(skip)]
    Custom(PipelineFn),
}

impl Pipeline {
    pub fn custom(f: impl Fn(HarvesterState) -> HarvesterState + Send + Sync + 'static) -> Self {
        Pipeline::Custom(Arc::new(f))
    }

    pub fn clip(component: StateIndex, min: Option<f64>, max: Option<f64>) -> Self {
        Pipeline::Clip { component, min, max }
    }

    pub fn apply(&self, state: HarvesterState) -> HarvesterState {
        match self {
            Pipeline::Clip { component, min, max } => {
                let mut out = state;
                let mut v = state.get(*component);
                if let Some(lo) = min {
                    v = v.max(*lo);
                }
                if let Some(hi) = max {
                    v = v.min(*hi);
                }
                out.set(*component, v);
                out
            }
            Pipeline::Custom(f) => f(state),
        }
    }

    pub fn is_persistable(&self) -> bool {
        !matches!(self, Pipeline::Custom(_))
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pipeline::Clip { component, min, max } => f
                .debug_struct("Clip")
                .field("component", component)
                .field("min", min)
                .field("max", max)
                .finish(),
            Pipeline::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

/// Named pipelines; insertion order is execution order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipelineSet {
    entries: Vec<(String, Pipeline)>,
}

impl PipelineSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `pipeline` under `name`. Re-using a name replaces the earlier
    /// pipeline but keeps its position.
    pub fn set(&mut self, name: impl Into<String>, pipeline: Pipeline) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = pipeline,
            None => self.entries.push((name, pipeline)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Pipeline> {
        let pos = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn get(&self, name: &str) -> Option<&Pipeline> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, p)| p)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every pipeline, in order, on one state.
    pub fn apply(&self, state: HarvesterState) -> HarvesterState {
        self.entries.iter().fold(state, |s, (_, p)| p.apply(s))
    }

    pub fn is_persistable(&self) -> bool {
        self.entries.iter().all(|(_, p)| p.is_persistable())
    }
}
