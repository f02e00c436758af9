//! Test modules for turul-callback-server

mod serve_tests;
