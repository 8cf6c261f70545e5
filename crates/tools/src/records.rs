//! Read-only driver invoice records
//!
//! Static in-memory data standing in for the billing database. The
//! orchestrator's invoice sub-dialogue reads from here; nothing writes.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One line of the monthly swap breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapLine {
    pub count: u32,
    pub rate: u32,
    pub cost: u32,
}

/// Monthly swap summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapSummary {
    pub total_swaps_month: u32,
    pub primary_swaps: SwapLine,
    pub secondary_swaps: SwapLine,
}

/// Monthly penalty summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PenaltySummary {
    pub total_incidents: u32,
    pub exempted_incidents: u32,
    pub chargeable_incidents: u32,
    pub penalty_rate: u32,
    pub total_penalty_cost: u32,
    pub penalty_diverted: u32,
}

/// Monthly financial totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Financials {
    pub total_swap_cost: u32,
    pub net_penalty_payable: u32,
    pub final_total_payable: u32,
}

/// One driver's monthly invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub driver_id: String,
    pub swaps_summary: SwapSummary,
    pub penalty_summary: PenaltySummary,
    pub financials: Financials,
}

#[allow(clippy::too_many_arguments)]
fn record(
    driver_id: &str,
    total_swaps: u32,
    primary: (u32, u32, u32),
    secondary: (u32, u32, u32),
    incidents: (u32, u32, u32),
    penalty_cost: (u32, u32),
    financials: (u32, u32, u32),
) -> InvoiceRecord {
    InvoiceRecord {
        driver_id: driver_id.to_string(),
        swaps_summary: SwapSummary {
            total_swaps_month: total_swaps,
            primary_swaps: SwapLine {
                count: primary.0,
                rate: primary.1,
                cost: primary.2,
            },
            secondary_swaps: SwapLine {
                count: secondary.0,
                rate: secondary.1,
                cost: secondary.2,
            },
        },
        penalty_summary: PenaltySummary {
            total_incidents: incidents.0,
            exempted_incidents: incidents.1,
            chargeable_incidents: incidents.2,
            penalty_rate: 120,
            total_penalty_cost: penalty_cost.0,
            penalty_diverted: penalty_cost.1,
        },
        financials: Financials {
            total_swap_cost: financials.0,
            net_penalty_payable: financials.1,
            final_total_payable: financials.2,
        },
    }
}

static INVOICES: Lazy<HashMap<&'static str, InvoiceRecord>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert(
        "D105",
        record("D105", 35, (20, 170, 3400), (15, 70, 1050), (6, 4, 2), (240, 120), (4450, 120, 4570)),
    );
    map.insert(
        "D212",
        record("D212", 45, (25, 170, 4250), (20, 70, 1400), (3, 4, 0), (0, 0), (5650, 0, 5650)),
    );
    map.insert(
        "D307",
        record("D307", 22, (15, 170, 2550), (7, 70, 490), (10, 4, 6), (720, 300), (3040, 420, 3460)),
    );
    map.insert(
        "D418",
        record("D418", 18, (18, 170, 3060), (0, 70, 0), (5, 4, 1), (120, 60), (3060, 60, 3120)),
    );
    map.insert(
        "D523",
        record("D523", 60, (28, 170, 4760), (32, 70, 2240), (8, 4, 4), (480, 480), (7000, 0, 7000)),
    );
    map
});

/// Read-only handle over the invoice records
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordStore;

impl RecordStore {
    pub fn new() -> Self {
        Self
    }

    /// Look up an invoice by normalized driver id
    pub fn get(&self, driver_id: &str) -> Option<&'static InvoiceRecord> {
        INVOICES.get(driver_id)
    }

    pub fn contains(&self, driver_id: &str) -> bool {
        INVOICES.contains_key(driver_id)
    }
}
