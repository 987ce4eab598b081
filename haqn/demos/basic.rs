//! Basic example of the Haqn DI container.

use haqn::{Container, Factory, Injectable, Injected, Result, args, interface};
use std::sync::Arc;

// === Define your traits and types ===

pub trait Logger: Send + Sync {
    fn log(&self, msg: &str);
}

pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[LOG] {msg}");
    }
}

pub trait Database: Send + Sync {
    fn query(&self, sql: &str) -> String;
}

#[derive(Default, Injectable)]
pub struct Postgres {
    #[inject]
    pub logger: Injected<dyn Logger>,
    url: String,
}

impl Database for Postgres {
    fn query(&self, sql: &str) -> String {
        if let Some(logger) = self.logger.get() {
            logger.log(&format!("Executing: {sql}"));
        }
        format!("Results from {}", self.url)
    }
}

#[derive(Default, Injectable)]
pub struct UserService {
    #[inject]
    pub db: Injected<dyn Database>,
    #[inject]
    pub logger: Injected<dyn Logger>,
}

impl UserService {
    fn get_user(&self, id: u64) -> String {
        if let Some(logger) = self.logger.get() {
            logger.log(&format!("Getting user {id}"));
        }
        match self.db.get() {
            Some(db) => db.query(&format!("SELECT * FROM users WHERE id = {id}")),
            None => "no database".to_string(),
        }
    }
}

pub trait Greeting: Send + Sync {
    fn text(&self) -> &str;
}

pub struct Hello(String);

impl Greeting for Hello {
    fn text(&self) -> &str {
        &self.0
    }
}

haqn::implement!(dyn Logger => ConsoleLogger);
haqn::implement!(dyn Database => Postgres);
haqn::implement!(dyn Greeting => Hello);

fn main() -> Result<()> {
    // Initialize tracing (logging)
    tracing_subscriber::fmt()
        .with_env_filter("haqn_container=debug")
        .init();

    let mut container = Container::new();

    container.bind(&interface::<dyn Logger>(), Arc::new(ConsoleLogger))?;
    container.bind(
        &interface::<dyn Database>(),
        Arc::new(Postgres {
            url: "postgres://localhost/myapp".to_string(),
            ..Default::default()
        }),
    )?;
    container.bind(
        &interface::<dyn Greeting>(),
        Factory::new(|name: String| -> Arc<dyn Greeting> { Arc::new(Hello(format!("Hello, {name}!"))) }),
    )?;

    println!("✅ Container ready: {container:?}");

    // === Field injection, recursive into the bound Postgres ===
    let service = UserService::default();
    container.inject(&service)?;
    println!("👤 {}", service.get_user(42));

    // === Factories take their arguments at resolve time ===
    let greeting = container.resolve(&interface::<dyn Greeting>(), args!["Haqn".to_string()])?;
    if let Some(greeting) = greeting.get::<dyn Greeting>() {
        println!("👋 {}", greeting.text());
    }

    println!("\n🎉 Everything works!");
    Ok(())
}
