pub mod error;
pub mod generator;
pub mod model;
pub mod solver;

pub use error::{AttemptFailure, ConfigurationError, GenerationError};
pub use generator::{GeneratorSettings, PuzzleGenerator};

#[cfg(test)]
mod tests {
    use std::sync::Once;
    use test_context::TestContext;

    static INIT_LOGGER: Once = Once::new();

    pub struct UsingLogger {
        _value: String,
    }

    impl TestContext for UsingLogger {
        fn setup() -> UsingLogger {
            INIT_LOGGER.call_once(|| {
                let _ = env_logger::builder().is_test(true).try_init();
            });

            UsingLogger {
                _value: "Hello, World!".to_string(),
            }
        }

        fn teardown(self) {}
    }
}
