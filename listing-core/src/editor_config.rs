//! Listing editor configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Local, NaiveDate, Utc};
use chrono_tz::Tz;
use config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::availability::{AvailabilityPlan, BookingState};
use crate::error::{ListingError, ListingResult};

static DEFAULT_PROVIDER: &str = "sharetribe";
static DEFAULT_REQUEST_TIMEOUT: &str = "10s";

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

fn default_request_timeout() -> String {
    DEFAULT_REQUEST_TIMEOUT.to_string()
}

fn default_booking_states() -> Vec<BookingState> {
    vec![BookingState::Pending, BookingState::Accepted]
}

fn default_seats() -> u32 {
    1
}

/// Configuration at ~/.config/listing-editor/config.toml
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EditorConfig {
    /// Provider binary suffix: `listing-provider-<provider>`.
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Timeout for a single provider call, e.g. "10s" or "1m 30s".
    #[serde(default = "default_request_timeout")]
    pub request_timeout: String,

    /// Booking states that make a day show as reserved.
    #[serde(default = "default_booking_states")]
    pub booking_states: Vec<BookingState>,

    /// Seats of the default every-day availability plan.
    #[serde(default = "default_seats")]
    pub default_seats: u32,

    /// IANA timezone of the viewer's calendar. Host local time if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            provider: default_provider(),
            request_timeout: default_request_timeout(),
            booking_states: default_booking_states(),
            default_seats: default_seats(),
            timezone: None,
        }
    }
}

impl EditorConfig {
    pub fn config_path() -> ListingResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ListingError::Config("Could not determine config directory".into()))?
            .join("listing-editor");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the user's config, writing a commented default first if missing.
    pub fn load() -> ListingResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::from_path(&config_path)
    }

    pub fn from_path(path: &Path) -> ListingResult<Self> {
        let config: EditorConfig = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .build()
            .map_err(|e| ListingError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ListingError::Config(e.to_string()))?;

        // Surface bad values at load time rather than on first use
        config.timeout()?;
        config.tz()?;

        Ok(config)
    }

    pub fn save(&self, path: &Path) -> ListingResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ListingError::Config(e.to_string()))?;

        std::fs::write(path, content)
            .map_err(|e| ListingError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> ListingResult<()> {
        let contents = format!(
            "\
# listing-editor configuration

# Provider binary used for marketplace requests (listing-provider-<name>):
# provider = \"{}\"

# Timeout for each provider request:
# request_timeout = \"{}\"

# Bookings in these states mark days as reserved:
# booking_states = [\"pending\", \"accepted\"]

# Seats offered every day by the default availability plan:
# default_seats = 1

# Timezone used to decide which day is today (defaults to the system zone):
# timezone = \"Europe/Helsinki\"
",
            DEFAULT_PROVIDER, DEFAULT_REQUEST_TIMEOUT
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ListingError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| ListingError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    pub fn timeout(&self) -> ListingResult<Duration> {
        humantime::parse_duration(&self.request_timeout).map_err(|e| {
            ListingError::Config(format!("Invalid request_timeout '{}': {e}", self.request_timeout))
        })
    }

    fn tz(&self) -> ListingResult<Option<Tz>> {
        self.timezone
            .as_deref()
            .map(|name| {
                name.parse::<Tz>()
                    .map_err(|_| ListingError::Config(format!("Unknown timezone '{name}'")))
            })
            .transpose()
    }

    /// The viewer's current calendar day.
    pub fn today(&self) -> ListingResult<NaiveDate> {
        Ok(match self.tz()? {
            Some(tz) => Utc::now().with_timezone(&tz).date_naive(),
            None => Local::now().date_naive(),
        })
    }

    /// The every-day plan used while the listing has none of its own.
    pub fn default_plan(&self) -> AvailabilityPlan {
        AvailabilityPlan::every_day(self.default_seats)
    }
}
