/// Unit tests for the progress engine and reminder resolution
mod scenario_tests;
mod property_tests;
