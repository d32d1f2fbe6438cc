use serde::Deserialize;
use ts_rs::TS;

pub const DEFAULT_REVENUE_MONTHS: u32 = 12;
pub const MAX_REVENUE_MONTHS: u32 = 60;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/statistics.ts")]
pub struct MonthlyRevenueQuery {
    pub months: Option<u32>,
}

impl MonthlyRevenueQuery {
    pub fn months(&self) -> Result<u32, &'static str> {
        match self.months {
            None => Ok(DEFAULT_REVENUE_MONTHS),
            Some(m) if (1..=MAX_REVENUE_MONTHS).contains(&m) => Ok(m),
            Some(_) => Err("months must be between 1 and 60"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_months_range() {
        assert_eq!(MonthlyRevenueQuery { months: None }.months(), Ok(12));
        assert_eq!(MonthlyRevenueQuery { months: Some(1) }.months(), Ok(1));
        assert_eq!(MonthlyRevenueQuery { months: Some(60) }.months(), Ok(60));
        assert!(MonthlyRevenueQuery { months: Some(0) }.months().is_err());
        assert!(MonthlyRevenueQuery { months: Some(61) }.months().is_err());
    }
}
