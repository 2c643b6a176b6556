pub mod classify;
pub mod contract;
pub mod etl;
pub mod layer;
pub mod pipeline;
pub mod tooltip;

pub use crate::domain::model::{RawLayer, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
