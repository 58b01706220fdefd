/// Integration tests against a real SQLite file
mod storage_tests;
mod lifecycle_tests;
mod server_tests;
