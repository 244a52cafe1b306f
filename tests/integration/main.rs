mod common;
mod logging_tests;
