//! Static catalog of the standard BambooHR employee fields.
//!
//! The table is a single `'static` slice shared by every client. It is used
//! to validate field lists and write payloads, and to expand "all fields"
//! requests. Custom fields (`customXyz`, numeric ids) are not listed; turn
//! off `verify_fields` in `ClientConfig` to pass them through.

use crate::error::ApiError;

/// Value type tag reported by BambooHR for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Email,
    Country,
    Date,
    List,
    Status,
    Gender,
    Phone,
    Timestamp,
    Currency,
    PayType,
    Ssn,
    Sin,
    State,
    Employee,
    Bool,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Email => "email",
            FieldKind::Country => "country",
            FieldKind::Date => "date",
            FieldKind::List => "list",
            FieldKind::Status => "status",
            FieldKind::Gender => "gender",
            FieldKind::Phone => "phone",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Currency => "currency",
            FieldKind::PayType => "pay_type",
            FieldKind::Ssn => "ssn",
            FieldKind::Sin => "sin",
            FieldKind::State => "state",
            FieldKind::Employee => "employee",
            FieldKind::Bool => "bool",
        }
    }
}

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub description: &'static str,
}

impl FieldSpec {
    const fn new(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self { name, kind, description }
    }
}

pub static EMPLOYEE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("address1", FieldKind::Text, "The employee's first address line"),
    FieldSpec::new("address2", FieldKind::Text, "The employee's second address line"),
    FieldSpec::new("age", FieldKind::Integer, "The employee's age. Not editable. To change update dateOfBirth, instead."),
    FieldSpec::new("bestEmail", FieldKind::Email, "The employee's work email if set, otherwise their home email"),
    FieldSpec::new("birthday", FieldKind::Text, "The employee's month and day of birth. Not editable. To change update dateOfBirth, instead."),
    FieldSpec::new("city", FieldKind::Text, "The employee's city"),
    FieldSpec::new("country", FieldKind::Country, "The employee's country"),
    FieldSpec::new("dateOfBirth", FieldKind::Date, "The date the employee was born"),
    FieldSpec::new("department", FieldKind::List, "The employee's CURRENT department."),
    FieldSpec::new("division", FieldKind::List, "The employee's CURRENT division"),
    FieldSpec::new("eeo", FieldKind::List, "The employee's EEO job category. These are defined by the U.S. Equal Employment Opportunity Commission"),
    FieldSpec::new("employeeNumber", FieldKind::Text, "Employee number (assigned by your company)"),
    FieldSpec::new("employmentStatus", FieldKind::Status, "DEPRECATED. Please use 'status' instead. The employee's employee status (Active,Inactive)"),
    FieldSpec::new("employmentHistoryStatus", FieldKind::List, "The employee's CURRENT employment status. Options are customized by account."),
    FieldSpec::new("ethnicity", FieldKind::List, "The employee's ethnicity"),
    FieldSpec::new("exempt", FieldKind::List, "The FLSA employee exemption code (Exempt or Non-exempt)"),
    FieldSpec::new("firstName", FieldKind::Text, "The employee's first name"),
    FieldSpec::new("flsaCode", FieldKind::List, "The employee's FLSA code. Ie: 'Exempt', 'Non-excempt'"),
    FieldSpec::new("fullName1", FieldKind::Text, "Employee's first and last name. Example: John Doe. Ready only."),
    FieldSpec::new("fullName2", FieldKind::Text, "Employee's last and first name. Example: Doe, John. Read only."),
    FieldSpec::new("fullName3", FieldKind::Text, "Employee's full name with nickname. Example: Doe, John Quentin (JDog). Read only."),
    FieldSpec::new("fullName4", FieldKind::Text, "employee's full name without nickname. Last name first. Example: Doe, John Quentin. Read only"),
    FieldSpec::new("fullName5", FieldKind::Text, "employee's full name without nickname. First name first. Example: John Quentin Doe. Read only"),
    FieldSpec::new("displayName", FieldKind::Text, "employee's name displayed in a format configured by the user. Read only"),
    FieldSpec::new("gender", FieldKind::Gender, "The employee's gender. Legal values are 'Male', 'Female'"),
    FieldSpec::new("hireDate", FieldKind::Date, "The date the employee was hired"),
    FieldSpec::new("homeEmail", FieldKind::Email, "The employee's home email address"),
    FieldSpec::new("homePhone", FieldKind::Phone, "The employee's home phone number"),
    FieldSpec::new("id", FieldKind::Integer, "Employee id (automatically assigned by BambooHR). Not editable."),
    FieldSpec::new("jobTitle", FieldKind::List, "The CURRENT value of the employee's job title, updating this field will create a new row in position history"),
    FieldSpec::new("lastChanged", FieldKind::Timestamp, "The date and time that the employee record was last changed"),
    FieldSpec::new("lastName", FieldKind::Text, "The employee's last name"),
    FieldSpec::new("location", FieldKind::List, "The employee's CURRENT location"),
    FieldSpec::new("maritalStatus", FieldKind::List, "The employee's marital status ('Single' or 'Married')"),
    FieldSpec::new("middleName", FieldKind::Text, "The employee's middle name"),
    FieldSpec::new("mobilePhone", FieldKind::Phone, "The employee's mobile phone number"),
    FieldSpec::new("nickname", FieldKind::Text, "The employee's nickname"),
    FieldSpec::new("payChangeReason", FieldKind::List, "The reason for the employee's last pay rate change."),
    FieldSpec::new("payGroup", FieldKind::List, "The custom pay group that the employee belongs to."),
    FieldSpec::new("payGroupId", FieldKind::Integer, "The id value corresponding to the pay group that an employee belongs to"),
    FieldSpec::new("payRate", FieldKind::Currency, "The employee's CURRENT pay rate. ie: $8.25"),
    FieldSpec::new("payRateEffectiveDate", FieldKind::Date, "The date most recent change was made."),
    FieldSpec::new("payType", FieldKind::PayType, "The employee's CURRENT pay type. ie: 'hourly','salary','commission','exception hourly','monthly','piece rate','contract','daily'"),
    FieldSpec::new("ssn", FieldKind::Ssn, "The employee's social security number"),
    FieldSpec::new("sin", FieldKind::Sin, "The employee's Canadian Social Insurance Number"),
    FieldSpec::new("state", FieldKind::State, "The employee's state/province"),
    FieldSpec::new("stateCode", FieldKind::Text, "The 2 character abbreviation for the employee's state (US only). Not editable."),
    FieldSpec::new("status", FieldKind::Status, "'status' indicates whether you are using BambooHR to track data about this employee. Valid values are 'Active', 'Inactive'."),
    FieldSpec::new("supervisor", FieldKind::Employee, "The employee's CURRENT supervisor. Not editable."),
    FieldSpec::new("supervisorId", FieldKind::Integer, "The 'employeeNumber' of the employee's CURRENT supervisor. Not editable."),
    FieldSpec::new("supervisorEId", FieldKind::Integer, "The 'id' of the employee's CURRENT supervisor. Not editable."),
    FieldSpec::new("terminationDate", FieldKind::Date, "The date the employee was terminated"),
    FieldSpec::new("workEmail", FieldKind::Email, "The employee's work email address"),
    FieldSpec::new("workPhone", FieldKind::Phone, "The employee's work phone number, without extension"),
    FieldSpec::new("workPhonePlusExtension", FieldKind::Text, "The employee's work phone and extension. Not editable."),
    FieldSpec::new("workPhoneExtension", FieldKind::Text, "The employees work phone extension (if any)"),
    FieldSpec::new("zipcode", FieldKind::Text, "The employee's zipcode"),
    FieldSpec::new("photoUploaded", FieldKind::Bool, "The employee has uploaded a photo"),
    FieldSpec::new("rehireDate", FieldKind::Date, "The date the employee was rehired"),
    FieldSpec::new("adpCompanyCode", FieldKind::List, ""),
    FieldSpec::new("adpFileNumber", FieldKind::Text, ""),
    FieldSpec::new("standardHoursPerWeek", FieldKind::Integer, ""),
    FieldSpec::new("earningsDate", FieldKind::Date, ""),
    FieldSpec::new("earningsPriorYear", FieldKind::Currency, ""),
    FieldSpec::new("bonusDate", FieldKind::Date, ""),
    FieldSpec::new("bonusAmount", FieldKind::Currency, ""),
    FieldSpec::new("bonusReason", FieldKind::List, ""),
    FieldSpec::new("bonusComment", FieldKind::Text, ""),
    FieldSpec::new("commisionDate", FieldKind::Date, ""),
    FieldSpec::new("commissionAmount", FieldKind::Currency, ""),
    FieldSpec::new("commissionComment", FieldKind::Text, ""),
    FieldSpec::new("benefitClassDate", FieldKind::Date, ""),
    FieldSpec::new("benefitClassClass", FieldKind::List, ""),
    FieldSpec::new("benefitClassChangeReason", FieldKind::List, ""),];

/// Look up a field by its camelCase name.
pub fn lookup(name: &str) -> Option<&'static FieldSpec> {
    EMPLOYEE_FIELDS.iter().find(|f| f.name == name)
}

pub fn is_known(name: &str) -> bool {
    lookup(name).is_some()
}

/// Names of every catalog field, in catalog order.
pub fn all_field_names() -> impl Iterator<Item = &'static str> {
    EMPLOYEE_FIELDS.iter().map(|f| f.name)
}

/// Fail on the first name that is not in the catalog.
pub fn validate_fields<'a, I>(names: I) -> Result<(), ApiError>
where
    I: IntoIterator<Item = &'a str>,
{
    for name in names {
        if !is_known(name) {
            return Err(ApiError::Validation(format!("unknown field: {name}")));
        }
    }
    Ok(())
}
