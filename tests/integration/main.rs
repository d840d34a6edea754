mod cache_test;
mod completion_test;
mod definition_test;
mod diagnostics_test;
mod fixture;
mod repository_test;
