use serde::{Deserialize, Serialize};

pub const EMPLOYMENT_STATUS_OPTIONS: [&str; 5] =
    ["Employed", "Self-Employed", "Unemployed", "Student", "Retired"];

pub const LOAN_PURPOSE_OPTIONS: [&str; 7] = [
    "Debt Consolidation",
    "Home Improvement",
    "Major Purchase",
    "Business",
    "Education",
    "Medical Expenses",
    "Other",
];

/// Operator-entered identity and context for the applicant being assessed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileRecord {
    pub applicant_name: String,
    pub age: String,
    pub location: String,
    pub employment_status: String,
    pub education: String,
    pub profession: String,
    pub family_composition: String,
    pub dependents: String,
}

impl Default for ProfileRecord {
    fn default() -> Self {
        Self {
            applicant_name: String::new(),
            age: String::new(),
            location: String::new(),
            employment_status: EMPLOYMENT_STATUS_OPTIONS[0].to_string(),
            education: String::new(),
            profession: String::new(),
            family_composition: String::new(),
            dependents: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinancialData {
    pub income: String,
    pub income_stability: String,
    pub employment_history_years: String,
    pub job_tenure_months: String,
    pub existing_debts: String,
    pub savings_amount: String,
    pub investment_amount: String,
    pub credit_score: String,
    pub payment_history_notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlternativeData {
    pub bank_transaction_patterns: String,
    pub utility_payment_history: String,
    pub rental_history: String,
    pub digital_wallet_usage: String,
    pub ecommerce_activity: String,
    pub social_media_financial_indicators: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoanDetailsData {
    pub requested_loan_amount: String,
    pub loan_purpose: String,
    pub proposed_repayment_term_months: String,
    pub collateral_offered: String,
}

impl Default for LoanDetailsData {
    fn default() -> Self {
        Self {
            requested_loan_amount: String::new(),
            loan_purpose: LOAN_PURPOSE_OPTIONS[0].to_string(),
            proposed_repayment_term_months: String::new(),
            collateral_offered: String::new(),
        }
    }
}

/// In-progress assessment input. `Default` is the empty template used for new assessments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationDraft {
    pub financial_data: FinancialData,
    pub alternative_data: AlternativeData,
    pub loan_details: LoanDetailsData,
}

impl ApplicationDraft {
    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::Financial(field) => field.value(&self.financial_data),
            DraftField::Alternative(field) => field.value(&self.alternative_data),
            DraftField::Loan(field) => field.value(&self.loan_details),
        }
    }

    /// Overwrite a single field. Callers outside the session should go through
    /// `AssessmentSession::edit_draft` so the displayed result is invalidated.
    pub(crate) fn set(&mut self, field: DraftField, value: String) {
        let slot = match field {
            DraftField::Financial(field) => field.slot(&mut self.financial_data),
            DraftField::Alternative(field) => field.slot(&mut self.alternative_data),
            DraftField::Loan(field) => field.slot(&mut self.loan_details),
        };
        *slot = value;
    }
}

/// Profile plus the three draft sections, exactly as sent to the generator and archived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteApplicationRecord {
    pub personal_info: ProfileRecord,
    pub financial_data: FinancialData,
    pub alternative_data: AlternativeData,
    pub loan_details: LoanDetailsData,
}

impl CompleteApplicationRecord {
    /// Owned copy of the live profile and draft; later edits cannot reach the record.
    pub fn assemble(profile: &ProfileRecord, draft: &ApplicationDraft) -> Self {
        Self {
            personal_info: profile.clone(),
            financial_data: draft.financial_data.clone(),
            alternative_data: draft.alternative_data.clone(),
            loan_details: draft.loan_details.clone(),
        }
    }

    pub fn draft(&self) -> ApplicationDraft {
        ApplicationDraft {
            financial_data: self.financial_data.clone(),
            alternative_data: self.alternative_data.clone(),
            loan_details: self.loan_details.clone(),
        }
    }
}

/// Address of a single editable draft field, `section` + `field` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Financial(FinancialField),
    Alternative(AlternativeField),
    Loan(LoanField),
}

impl DraftField {
    pub fn parse(section: &str, field: &str) -> Option<Self> {
        match section {
            "financialData" => FinancialField::ALL
                .into_iter()
                .find(|candidate| candidate.name() == field)
                .map(Self::Financial),
            "alternativeData" => AlternativeField::ALL
                .into_iter()
                .find(|candidate| candidate.name() == field)
                .map(Self::Alternative),
            "loanDetails" => LoanField::ALL
                .into_iter()
                .find(|candidate| candidate.name() == field)
                .map(Self::Loan),
            _ => None,
        }
    }

    pub const fn section(self) -> &'static str {
        match self {
            DraftField::Financial(_) => "financialData",
            DraftField::Alternative(_) => "alternativeData",
            DraftField::Loan(_) => "loanDetails",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            DraftField::Financial(field) => field.name(),
            DraftField::Alternative(field) => field.name(),
            DraftField::Loan(field) => field.name(),
        }
    }

    pub fn all() -> impl Iterator<Item = DraftField> {
        FinancialField::ALL
            .into_iter()
            .map(Self::Financial)
            .chain(AlternativeField::ALL.into_iter().map(Self::Alternative))
            .chain(LoanField::ALL.into_iter().map(Self::Loan))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FinancialField {
    Income,
    IncomeStability,
    EmploymentHistoryYears,
    JobTenureMonths,
    ExistingDebts,
    SavingsAmount,
    InvestmentAmount,
    CreditScore,
    PaymentHistoryNotes,
}

impl FinancialField {
    pub const ALL: [FinancialField; 9] = [
        FinancialField::Income,
        FinancialField::IncomeStability,
        FinancialField::EmploymentHistoryYears,
        FinancialField::JobTenureMonths,
        FinancialField::ExistingDebts,
        FinancialField::SavingsAmount,
        FinancialField::InvestmentAmount,
        FinancialField::CreditScore,
        FinancialField::PaymentHistoryNotes,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            FinancialField::Income => "income",
            FinancialField::IncomeStability => "incomeStability",
            FinancialField::EmploymentHistoryYears => "employmentHistoryYears",
            FinancialField::JobTenureMonths => "jobTenureMonths",
            FinancialField::ExistingDebts => "existingDebts",
            FinancialField::SavingsAmount => "savingsAmount",
            FinancialField::InvestmentAmount => "investmentAmount",
            FinancialField::CreditScore => "creditScore",
            FinancialField::PaymentHistoryNotes => "paymentHistoryNotes",
        }
    }

    fn value(self, data: &FinancialData) -> &str {
        match self {
            FinancialField::Income => &data.income,
            FinancialField::IncomeStability => &data.income_stability,
            FinancialField::EmploymentHistoryYears => &data.employment_history_years,
            FinancialField::JobTenureMonths => &data.job_tenure_months,
            FinancialField::ExistingDebts => &data.existing_debts,
            FinancialField::SavingsAmount => &data.savings_amount,
            FinancialField::InvestmentAmount => &data.investment_amount,
            FinancialField::CreditScore => &data.credit_score,
            FinancialField::PaymentHistoryNotes => &data.payment_history_notes,
        }
    }

    fn slot(self, data: &mut FinancialData) -> &mut String {
        match self {
            FinancialField::Income => &mut data.income,
            FinancialField::IncomeStability => &mut data.income_stability,
            FinancialField::EmploymentHistoryYears => &mut data.employment_history_years,
            FinancialField::JobTenureMonths => &mut data.job_tenure_months,
            FinancialField::ExistingDebts => &mut data.existing_debts,
            FinancialField::SavingsAmount => &mut data.savings_amount,
            FinancialField::InvestmentAmount => &mut data.investment_amount,
            FinancialField::CreditScore => &mut data.credit_score,
            FinancialField::PaymentHistoryNotes => &mut data.payment_history_notes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlternativeField {
    BankTransactionPatterns,
    UtilityPaymentHistory,
    RentalHistory,
    DigitalWalletUsage,
    EcommerceActivity,
    SocialMediaFinancialIndicators,
}

impl AlternativeField {
    pub const ALL: [AlternativeField; 6] = [
        AlternativeField::BankTransactionPatterns,
        AlternativeField::UtilityPaymentHistory,
        AlternativeField::RentalHistory,
        AlternativeField::DigitalWalletUsage,
        AlternativeField::EcommerceActivity,
        AlternativeField::SocialMediaFinancialIndicators,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            AlternativeField::BankTransactionPatterns => "bankTransactionPatterns",
            AlternativeField::UtilityPaymentHistory => "utilityPaymentHistory",
            AlternativeField::RentalHistory => "rentalHistory",
            AlternativeField::DigitalWalletUsage => "digitalWalletUsage",
            AlternativeField::EcommerceActivity => "ecommerceActivity",
            AlternativeField::SocialMediaFinancialIndicators => "socialMediaFinancialIndicators",
        }
    }

    fn value(self, data: &AlternativeData) -> &str {
        match self {
            AlternativeField::BankTransactionPatterns => &data.bank_transaction_patterns,
            AlternativeField::UtilityPaymentHistory => &data.utility_payment_history,
            AlternativeField::RentalHistory => &data.rental_history,
            AlternativeField::DigitalWalletUsage => &data.digital_wallet_usage,
            AlternativeField::EcommerceActivity => &data.ecommerce_activity,
            AlternativeField::SocialMediaFinancialIndicators => {
                &data.social_media_financial_indicators
            }
        }
    }

    fn slot(self, data: &mut AlternativeData) -> &mut String {
        match self {
            AlternativeField::BankTransactionPatterns => &mut data.bank_transaction_patterns,
            AlternativeField::UtilityPaymentHistory => &mut data.utility_payment_history,
            AlternativeField::RentalHistory => &mut data.rental_history,
            AlternativeField::DigitalWalletUsage => &mut data.digital_wallet_usage,
            AlternativeField::EcommerceActivity => &mut data.ecommerce_activity,
            AlternativeField::SocialMediaFinancialIndicators => {
                &mut data.social_media_financial_indicators
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoanField {
    RequestedLoanAmount,
    LoanPurpose,
    ProposedRepaymentTermMonths,
    CollateralOffered,
}

impl LoanField {
    pub const ALL: [LoanField; 4] = [
        LoanField::RequestedLoanAmount,
        LoanField::LoanPurpose,
        LoanField::ProposedRepaymentTermMonths,
        LoanField::CollateralOffered,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            LoanField::RequestedLoanAmount => "requestedLoanAmount",
            LoanField::LoanPurpose => "loanPurpose",
            LoanField::ProposedRepaymentTermMonths => "proposedRepaymentTermMonths",
            LoanField::CollateralOffered => "collateralOffered",
        }
    }

    fn value(self, data: &LoanDetailsData) -> &str {
        match self {
            LoanField::RequestedLoanAmount => &data.requested_loan_amount,
            LoanField::LoanPurpose => &data.loan_purpose,
            LoanField::ProposedRepaymentTermMonths => &data.proposed_repayment_term_months,
            LoanField::CollateralOffered => &data.collateral_offered,
        }
    }

    fn slot(self, data: &mut LoanDetailsData) -> &mut String {
        match self {
            LoanField::RequestedLoanAmount => &mut data.requested_loan_amount,
            LoanField::LoanPurpose => &mut data.loan_purpose,
            LoanField::ProposedRepaymentTermMonths => &mut data.proposed_repayment_term_months,
            LoanField::CollateralOffered => &mut data.collateral_offered,
        }
    }
}
