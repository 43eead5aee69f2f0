mod bullet_points;
mod prompt;
mod spinner;

pub use bullet_points::{BulletPointPrinter, LineWriter, StdoutLineWriter};
pub use prompt::{prompt_select, prompt_validated};
pub use spinner::with_spinner;

#[cfg(test)]
pub(crate) use bullet_points::tests::RecordingLineWriter;
