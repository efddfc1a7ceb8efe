//! Word segmentation algorithms.
//!
//! Every algorithm implements [`Segmenter`]: prepared utterances in, the same
//! number of hypothesis utterances out.

pub mod dibs;
pub mod external;
pub mod puddle;
pub mod segmenter;
pub mod tp;

pub use dibs::{CorpusSummary, DibsKind, DibsModel, DibsSegmenter};
pub use external::CommandSegmenter;
pub use puddle::{Puddle, PuddleSegmenter};
pub use segmenter::{MockBehavior, MockSegmenter, Segmenter};
pub use tp::{Dependency, Threshold, TpSegmenter};
