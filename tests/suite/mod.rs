mod config;
mod dispatch;
mod scenario;
mod session;
