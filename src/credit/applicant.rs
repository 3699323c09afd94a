//! Loan applications and their mapping onto crisp engine inputs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::FisError;
use crate::fuzzy::CrispInputs;
use super::knowledge::{COLLATERAL, DBR, INCOME, LOAN, STATUS, TENURE};

/// Problems with a loan application, caught before inference
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApplicationError {
    #[error("monthly income must be positive, got {0}")]
    NonPositiveIncome(f64),
    #[error("loan amount must be positive, got {0}")]
    NonPositiveLoan(f64),
    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("unknown employment status '{0}'")]
    UnknownStatus(String),
    #[error("unknown collateral '{0}'")]
    UnknownCollateral(String),
    #[error("tenor must be 6, 12, 24 or 36 months, got {0}")]
    InvalidTenor(u32),
}

impl ApplicationError {
    fn field(&self) -> &'static str {
        match self {
            ApplicationError::NonPositiveIncome(_) => "monthly_income",
            ApplicationError::NonPositiveLoan(_) => "loan_amount",
            ApplicationError::OutOfRange { field, .. } => *field,
            ApplicationError::UnknownStatus(_) => "status",
            ApplicationError::UnknownCollateral(_) => "collateral",
            ApplicationError::InvalidTenor(_) => "tenor",
        }
    }
}

impl From<ApplicationError> for FisError {
    fn from(err: ApplicationError) -> Self {
        FisError::invalid_application(err.to_string()).with_context("field", err.field())
    }
}

fn normalize(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '_' || c == ' ' { '-' } else { c })
        .collect()
}

/// Employment status of the applicant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum EmploymentStatus {
    PartTime,
    Contract,
    Permanent,
}

impl EmploymentStatus {
    pub const ALL: [EmploymentStatus; 3] = [
        EmploymentStatus::PartTime,
        EmploymentStatus::Contract,
        EmploymentStatus::Permanent,
    ];

    /// Score on the `status` universe
    pub fn code(&self) -> f64 {
        match self {
            EmploymentStatus::PartTime => 2.0,
            EmploymentStatus::Contract => 5.0,
            EmploymentStatus::Permanent => 8.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentStatus::PartTime => "part-time",
            EmploymentStatus::Contract => "contract",
            EmploymentStatus::Permanent => "permanent",
        }
    }
}

impl FromStr for EmploymentStatus {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "part-time" | "parttime" => Ok(EmploymentStatus::PartTime),
            "contract" | "kontrak" => Ok(EmploymentStatus::Contract),
            "permanent" | "tetap" => Ok(EmploymentStatus::Permanent),
            _ => Err(ApplicationError::UnknownStatus(s.to_string())),
        }
    }
}

impl TryFrom<String> for EmploymentStatus {
    type Error = ApplicationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for EmploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collateral offered with the loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum Collateral {
    None,
    PayrollDeduction,
    ColleagueGuarantee,
    MotorcycleTitle,
    CarTitle,
    HouseCertificate,
    SupervisorGuarantee,
}

impl Collateral {
    pub const ALL: [Collateral; 7] = [
        Collateral::None,
        Collateral::PayrollDeduction,
        Collateral::ColleagueGuarantee,
        Collateral::MotorcycleTitle,
        Collateral::CarTitle,
        Collateral::HouseCertificate,
        Collateral::SupervisorGuarantee,
    ];

    /// Score on the `jaminan` universe
    pub fn code(&self) -> f64 {
        match self {
            Collateral::None => 2.0,
            Collateral::PayrollDeduction => 9.0,
            Collateral::ColleagueGuarantee => 5.0,
            Collateral::MotorcycleTitle => 4.0,
            Collateral::CarTitle => 6.0,
            Collateral::HouseCertificate => 8.0,
            Collateral::SupervisorGuarantee => 7.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Collateral::None => "none",
            Collateral::PayrollDeduction => "payroll-deduction",
            Collateral::ColleagueGuarantee => "colleague-guarantee",
            Collateral::MotorcycleTitle => "motorcycle-title",
            Collateral::CarTitle => "car-title",
            Collateral::HouseCertificate => "house-certificate",
            Collateral::SupervisorGuarantee => "supervisor-guarantee",
        }
    }
}

impl FromStr for Collateral {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "none" | "tidak-ada" => Ok(Collateral::None),
            "payroll-deduction" | "potong-gaji" | "potong-gaji-otomatis" => {
                Ok(Collateral::PayrollDeduction)
            }
            "colleague-guarantee" | "jaminan-rekan-kerja" => Ok(Collateral::ColleagueGuarantee),
            "motorcycle-title" | "bpkb-motor" => Ok(Collateral::MotorcycleTitle),
            "car-title" | "bpkb-mobil" => Ok(Collateral::CarTitle),
            "house-certificate" | "shm" | "shm-rumah" => Ok(Collateral::HouseCertificate),
            "supervisor-guarantee" | "surat-jaminan-atasan" => Ok(Collateral::SupervisorGuarantee),
            _ => Err(ApplicationError::UnknownCollateral(s.to_string())),
        }
    }
}

impl TryFrom<String> for Collateral {
    type Error = ApplicationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Collateral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repayment period in months
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Tenor(u32);

impl Tenor {
    pub const OFFERED: [u32; 4] = [6, 12, 24, 36];

    pub fn new(months: u32) -> Result<Self, ApplicationError> {
        if Self::OFFERED.contains(&months) {
            Ok(Self(months))
        } else {
            Err(ApplicationError::InvalidTenor(months))
        }
    }

    pub fn months(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for Tenor {
    type Error = ApplicationError;

    fn try_from(months: u32) -> Result<Self, Self::Error> {
        Tenor::new(months)
    }
}

impl From<Tenor> for u32 {
    fn from(tenor: Tenor) -> Self {
        tenor.0
    }
}

/// A member's loan request; amounts are in millions of rupiah
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoanApplication {
    pub status: EmploymentStatus,
    pub tenure_years: f64,
    pub monthly_income: f64,
    pub collateral: Collateral,
    pub loan_amount: f64,
    pub tenor: Tenor,
    /// Installments already paid elsewhere each month
    #[serde(default)]
    pub other_installments: f64,
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ApplicationError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ApplicationError::OutOfRange { field, value, min, max })
    }
}

impl LoanApplication {
    /// Reject values the cooperative's form would never accept
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if !(self.monthly_income > 0.0) {
            return Err(ApplicationError::NonPositiveIncome(self.monthly_income));
        }
        if !(self.loan_amount > 0.0) {
            return Err(ApplicationError::NonPositiveLoan(self.loan_amount));
        }
        check_range("tenure_years", self.tenure_years, 0.0, 10.0)?;
        check_range("monthly_income", self.monthly_income, 0.0, 20.0)?;
        check_range("loan_amount", self.loan_amount, 0.0, 50.0)?;
        check_range("other_installments", self.other_installments, 0.0, 20.0)?;
        Ok(())
    }

    /// Monthly installment of the requested loan
    pub fn installment(&self) -> f64 {
        self.loan_amount / self.tenor.months() as f64
    }

    pub fn total_installment(&self) -> f64 {
        self.installment() + self.other_installments
    }

    /// Debt-burden ratio in percent of monthly income
    pub fn dbr(&self) -> f64 {
        self.total_installment() / self.monthly_income * 100.0
    }

    /// Crisp values for the six antecedents of the knowledge base
    pub fn to_crisp_inputs(&self) -> CrispInputs {
        CrispInputs::new()
            .with(STATUS, self.status.code())
            .with(TENURE, self.tenure_years)
            .with(INCOME, self.monthly_income)
            .with(COLLATERAL, self.collateral.code())
            .with(LOAN, self.loan_amount)
            .with(DBR, self.dbr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn scenario_a() -> LoanApplication {
        LoanApplication {
            status: EmploymentStatus::Permanent,
            tenure_years: 3.0,
            monthly_income: 5.0,
            collateral: Collateral::None,
            loan_amount: 20.0,
            tenor: Tenor::new(6).unwrap(),
            other_installments: 0.0,
        }
    }

    #[test]
    fn test_lookup_tables() {
        let codes: Vec<f64> = EmploymentStatus::ALL.iter().map(|s| s.code()).collect();
        assert_eq!(codes, vec![2.0, 5.0, 8.0]);

        let codes: Vec<f64> = Collateral::ALL.iter().map(|c| c.code()).collect();
        assert_eq!(codes, vec![2.0, 9.0, 5.0, 4.0, 6.0, 8.0, 7.0]);
    }

    #[test]
    fn test_labels() {
        assert_eq!("Tetap".parse::<EmploymentStatus>().unwrap(), EmploymentStatus::Permanent);
        assert_eq!("kontrak".parse::<EmploymentStatus>().unwrap(), EmploymentStatus::Contract);
        assert_eq!("Part-time".parse::<EmploymentStatus>().unwrap(), EmploymentStatus::PartTime);
        assert_eq!("SHM Rumah".parse::<Collateral>().unwrap(), Collateral::HouseCertificate);
        assert_eq!("BPKB Motor".parse::<Collateral>().unwrap(), Collateral::MotorcycleTitle);
        assert_eq!("tidak_ada".parse::<Collateral>().unwrap(), Collateral::None);
        assert_eq!("Surat Jaminan Atasan".parse::<Collateral>().unwrap(), Collateral::SupervisorGuarantee);
        for c in Collateral::ALL {
            assert_eq!(c.as_str().parse::<Collateral>().unwrap(), c);
        }

        assert!(matches!(
            "freelance".parse::<EmploymentStatus>(),
            Err(ApplicationError::UnknownStatus(_))
        ));
        assert!(matches!("gold".parse::<Collateral>(), Err(ApplicationError::UnknownCollateral(_))));
    }

    #[test]
    fn test_tenor() {
        assert_eq!(Tenor::new(24).unwrap().months(), 24);
        assert_eq!(Tenor::new(18), Err(ApplicationError::InvalidTenor(18)));
    }

    #[test]
    fn test_dbr_arithmetic() {
        let app = scenario_a();
        assert!((app.installment() - 20.0 / 6.0).abs() < 1e-12);
        assert!((app.dbr() - 66.666_666_666).abs() < 1e-6);

        let app = LoanApplication {
            status: EmploymentStatus::Permanent,
            tenure_years: 10.0,
            monthly_income: 20.0,
            collateral: Collateral::HouseCertificate,
            loan_amount: 10.0,
            tenor: Tenor::new(36).unwrap(),
            other_installments: 0.0,
        };
        assert!((app.dbr() - 1.388_888_888).abs() < 1e-6);

        let with_other = LoanApplication {
            other_installments: 1.0,
            ..app
        };
        assert!((with_other.total_installment() - (10.0 / 36.0 + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_validate() {
        assert!(scenario_a().validate().is_ok());

        let app = LoanApplication { monthly_income: 0.0, ..scenario_a() };
        assert_eq!(app.validate(), Err(ApplicationError::NonPositiveIncome(0.0)));

        let app = LoanApplication { loan_amount: -5.0, ..scenario_a() };
        assert_eq!(app.validate(), Err(ApplicationError::NonPositiveLoan(-5.0)));

        let app = LoanApplication { tenure_years: 11.0, ..scenario_a() };
        assert!(matches!(
            app.validate(),
            Err(ApplicationError::OutOfRange { field: "tenure_years", .. })
        ));

        let app = LoanApplication { other_installments: f64::NAN, ..scenario_a() };
        let err = FisError::from(app.validate().unwrap_err());
        assert_eq!(err.code, ErrorCode::InvalidApplication);
        assert_eq!(err.context_field("field"), Some("other_installments"));
    }

    #[test]
    fn test_crisp_inputs() {
        let inputs = scenario_a().to_crisp_inputs();
        assert_eq!(inputs.len(), 6);
        assert_eq!(inputs.get(STATUS), Some(8.0));
        assert_eq!(inputs.get(COLLATERAL), Some(2.0));
        assert_eq!(inputs.get(LOAN), Some(20.0));
    }

    #[test]
    fn test_deserialize() {
        let json = r#"{
            "status": "tetap",
            "tenure_years": 10,
            "monthly_income": 20.0,
            "collateral": "shm-rumah",
            "loan_amount": 10,
            "tenor": 36
        }"#;
        let app: LoanApplication = serde_json::from_str(json).unwrap();
        assert_eq!(app.status, EmploymentStatus::Permanent);
        assert_eq!(app.collateral, Collateral::HouseCertificate);
        assert_eq!(app.tenor.months(), 36);
        assert_eq!(app.other_installments, 0.0);

        let bad = json.replace("36", "18");
        assert!(serde_json::from_str::<LoanApplication>(&bad).is_err());

        let out = serde_json::to_value(&app).unwrap();
        assert_eq!(out["collateral"], "house-certificate");
        assert_eq!(out["tenor"], 36);
    }
}
