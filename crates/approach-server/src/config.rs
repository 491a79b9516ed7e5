//! Server configuration from environment.

use std::env;
use std::path::PathBuf;

use approach_core::{Point3D, SimulationRules};

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// Roster loaded into the `default` session at startup
    pub planes_file: PathBuf,
    pub airport: Point3D,
    pub collision_threshold: f64,
    /// Arrival separation in minutes; defaults to the collision threshold
    pub time_separation_min: Option<f64>,
    pub max_iterations: usize,
    /// Reconcile speeds of the startup roster before serving
    pub reconcile: bool,
    /// Refuse to start when startup reconciliation diverges
    pub require_convergence: bool,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        let rules = SimulationRules::default();
        Self {
            server_port: 8080,
            planes_file: PathBuf::from("data/planes.json"),
            airport: Point3D::ORIGIN,
            collision_threshold: rules.collision_threshold,
            time_separation_min: rules.time_separation_min,
            max_iterations: rules.max_iterations,
            reconcile: false,
            require_convergence: false,
            log_json: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_parse("APPROACH_PORT").unwrap_or(defaults.server_port),
            planes_file: env::var("APPROACH_PLANES_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.planes_file),
            airport: env::var("APPROACH_AIRPORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.airport),
            collision_threshold: env_parse("APPROACH_COLLISION_THRESHOLD")
                .unwrap_or(defaults.collision_threshold),
            time_separation_min: env_parse("APPROACH_TIME_SEPARATION").or(defaults.time_separation_min),
            max_iterations: env_parse("APPROACH_MAX_ITERATIONS").unwrap_or(defaults.max_iterations),
            reconcile: env_flag("APPROACH_RECONCILE").unwrap_or(defaults.reconcile),
            require_convergence: env_flag("APPROACH_REQUIRE_CONVERGENCE")
                .unwrap_or(defaults.require_convergence),
            log_json: env_flag("APPROACH_LOG_JSON").unwrap_or(defaults.log_json),
        }
    }

    /// Simulation rules for sessions created without explicit rules.
    pub fn rules(&self) -> SimulationRules {
        SimulationRules {
            collision_threshold: self.collision_threshold,
            time_separation_min: self.time_separation_min,
            max_iterations: self.max_iterations,
            ..SimulationRules::default()
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn env_flag(key: &str) -> Option<bool> {
    env::var(key)
        .ok()
        .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}
