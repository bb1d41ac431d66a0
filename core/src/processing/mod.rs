pub mod counter;
pub mod engine;
pub mod sample_queue;
pub mod validator;
pub mod window;

pub use counter::StepCounter;
pub use engine::StepEngine;
pub use sample_queue::SampleQueue;
pub use validator::{ValidationReport, Validator};
pub use window::{Extraction, PeakTriple, SubWindow, Window, WindowExtractor};
