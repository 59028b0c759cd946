pub mod completion_watcher;
