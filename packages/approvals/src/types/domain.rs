//! The plant's independent data domains.

use serde::{Deserialize, Serialize};

/// Which kind of business record a mutation targets.
///
/// Each domain owns its record storage and mutation logic; the gate only
/// needs the discriminant to route a deferred mutation back to the right
/// domain module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainType {
    ProductionEntry,
    DowntimeEvent,
    FuelLog,
    GatePass,
    TroubleTicket,
    VibrationReading,
    MeterReading,
    Timesheet,
    Inspection,
    ShiftLog,
}

impl DomainType {
    /// All domains, for registry wiring and admin UIs.
    pub const ALL: [DomainType; 10] = [
        DomainType::ProductionEntry,
        DomainType::DowntimeEvent,
        DomainType::FuelLog,
        DomainType::GatePass,
        DomainType::TroubleTicket,
        DomainType::VibrationReading,
        DomainType::MeterReading,
        DomainType::Timesheet,
        DomainType::Inspection,
        DomainType::ShiftLog,
    ];

    /// Domain name as persisted on approval requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainType::ProductionEntry => "production_entry",
            DomainType::DowntimeEvent => "downtime_event",
            DomainType::FuelLog => "fuel_log",
            DomainType::GatePass => "gate_pass",
            DomainType::TroubleTicket => "trouble_ticket",
            DomainType::VibrationReading => "vibration_reading",
            DomainType::MeterReading => "meter_reading",
            DomainType::Timesheet => "timesheet",
            DomainType::Inspection => "inspection",
            DomainType::ShiftLog => "shift_log",
        }
    }
}

impl std::fmt::Display for DomainType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DomainType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DomainType::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("unknown domain type: {s}"))
    }
}
