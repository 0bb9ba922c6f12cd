//! Small-claims court form: jurisdiction check, bounded money amounts, and
//! the claimant/defendant field map written into the fixed form PDF.

use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;

use crate::documents::form::{fill_form, FormValue};
use crate::documents::letter::resolve_signer_name;
use crate::error::RenterKitError;
use crate::model::{Owner, Unit};

/// Statutory small-claims ceiling, in dollars. Amounts above it must be
/// filed in a different division, so validation rejects them outright.
pub const CLAIM_LIMIT: i64 = 2500;

/// Counties the form can be filed in.
pub const KENTUCKY_COUNTIES: &[&str] = &[
    "Adair", "Allen", "Anderson", "Ballard", "Barren", "Bath", "Bell", "Boone",
    "Bourbon", "Boyd", "Boyle", "Bracken", "Breathitt", "Breckinridge", "Bullitt",
    "Butler", "Caldwell", "Calloway", "Campbell", "Carlisle", "Carroll", "Carter",
    "Casey", "Christian", "Clark", "Clay", "Clinton", "Crittenden", "Cumberland",
    "Daviess", "Edmonson", "Elliott", "Estill", "Fayette", "Fleming", "Floyd",
    "Franklin", "Fulton", "Gallatin", "Garrard", "Grant", "Graves", "Grayson",
    "Green", "Greenup", "Hancock", "Hardin", "Harlan", "Harrison", "Hart",
    "Henderson", "Henry", "Hickman", "Hopkins", "Jackson", "Jefferson",
    "Jessamine", "Johnson", "Kenton", "Knott", "Knox", "Larue", "Laurel",
    "Lawrence", "Lee", "Leslie", "Letcher", "Lewis", "Lincoln", "Livingston",
    "Logan", "Lyon", "McCracken", "McCreary", "McLean", "Madison", "Magoffin",
    "Marion", "Marshall", "Martin", "Mason", "Meade", "Menifee", "Mercer",
    "Metcalfe", "Monroe", "Montgomery", "Morgan", "Muhlenberg", "Nelson",
    "Nicholas", "Ohio", "Oldham", "Owen", "Owsley", "Pendleton", "Perry",
    "Pike", "Powell", "Pulaski", "Robertson", "Rockcastle", "Rowan", "Russell",
    "Scott", "Shelby", "Simpson", "Spencer", "Taylor", "Todd", "Trigg",
    "Trimble", "Union", "Warren", "Washington", "Wayne", "Webster", "Whitley",
    "Wolfe", "Woodford",
];

/// Caller-supplied answers for a small-claims filing.
#[derive(Debug, Clone)]
pub struct SmallClaimsRequest {
    /// County where the claim is filed; must be a supported jurisdiction.
    pub county: String,
    pub is_landlord_company: bool,
    /// Amount sought. Bounded 0–2500, never clamped.
    pub claims_sum: Decimal,
    /// Estimated court costs. Bounded 0–2500, never clamped.
    pub court_costs: Decimal,
    /// The claims against the landlord, free text.
    pub claims: String,
    /// Signer name fallbacks for owners whose profile carries no name.
    pub sender_first_name: Option<String>,
    pub sender_last_name: Option<String>,
}

fn canonical_county(county: &str) -> Option<&'static str> {
    KENTUCKY_COUNTIES
        .iter()
        .find(|c| c.eq_ignore_ascii_case(county.trim()))
        .copied()
}

fn check_amount(name: &str, amount: Decimal) -> Result<(), RenterKitError> {
    if amount < Decimal::ZERO || amount > Decimal::from(CLAIM_LIMIT) {
        return Err(RenterKitError::AmountOutOfRange {
            name: name.to_string(),
            min: "0".to_string(),
            max: CLAIM_LIMIT.to_string(),
        });
    }
    Ok(())
}

/// Validate a request and build the widget field map for the court form.
///
/// Widget names follow the fillable small-claims complaint PDF; anything
/// the form does not define is simply never looked up.
pub fn small_claims_field_map(
    request: &SmallClaimsRequest,
    owner: &Owner,
    unit: &Unit,
) -> Result<HashMap<String, FormValue>, RenterKitError> {
    let county = canonical_county(&request.county).ok_or_else(|| {
        RenterKitError::UnsupportedJurisdiction {
            county: request.county.trim().to_string(),
        }
    })?;
    check_amount("claims_sum", request.claims_sum)?;
    check_amount("court_costs", request.court_costs)?;

    let (first_name, last_name) = resolve_signer_name(
        owner,
        request.sender_first_name.as_deref(),
        request.sender_last_name.as_deref(),
    )?;
    let plaintiff = format!("{first_name} {last_name}").trim().to_string();

    let mut map = HashMap::new();
    map.insert("county".to_string(), FormValue::Text(county.to_string()));
    map.insert("plaintiff_name".to_string(), FormValue::Text(plaintiff));
    map.insert(
        "plaintiff_address".to_string(),
        FormValue::Text(unit.address_1.clone()),
    );
    map.insert(
        "plaintiff_city_state_zip".to_string(),
        FormValue::Text(format!("{}, {} {}", unit.city, unit.state, unit.zip_code)),
    );
    map.insert(
        "defendant_name".to_string(),
        FormValue::Text(unit.landlord_name.clone()),
    );
    map.insert(
        "defendant_address".to_string(),
        FormValue::Text(unit.landlord_address_1.clone()),
    );
    map.insert(
        "defendant_city_state_zip".to_string(),
        FormValue::Text(format!(
            "{}, {} {}",
            unit.landlord_city, unit.landlord_state, unit.landlord_zip_code
        )),
    );
    map.insert(
        "defendant_is_company".to_string(),
        FormValue::Check(request.is_landlord_company),
    );
    map.insert(
        "claims_sum".to_string(),
        FormValue::Money(request.claims_sum),
    );
    map.insert(
        "court_costs".to_string(),
        FormValue::Money(request.court_costs),
    );
    map.insert(
        "total_amount".to_string(),
        FormValue::Money(request.claims_sum + request.court_costs),
    );
    map.insert("claims".to_string(), FormValue::Text(request.claims.clone()));

    Ok(map)
}

/// Fill the small-claims court form with a validated request.
pub fn render_small_claims(
    form_pdf: &[u8],
    request: &SmallClaimsRequest,
    owner: &Owner,
    unit: &Unit,
) -> Result<Vec<u8>, RenterKitError> {
    let field_map = small_claims_field_map(request, owner, unit)?;
    debug!(county = %request.county, "filling small claims form");
    fill_form(form_pdf, &field_map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn owner() -> Owner {
        Owner {
            id: Uuid::new_v4(),
            slug: "ann".into(),
            first_name: "Ann".into(),
            last_name: "Renter".into(),
            email: "ann@example.com".into(),
        }
    }

    fn unit(owner_id: Uuid) -> Unit {
        let mut unit = Unit::new(owner_id, "123 Main St");
        unit.city = "Louisville".into();
        unit.state = "KY".into();
        unit.zip_code = "40202".into();
        unit.landlord_name = "Brick LLC".into();
        unit.landlord_address_1 = "9 Market Sq".into();
        unit.landlord_city = "Louisville".into();
        unit.landlord_state = "KY".into();
        unit.landlord_zip_code = "40203".into();
        unit
    }

    fn request() -> SmallClaimsRequest {
        SmallClaimsRequest {
            county: "Jefferson".into(),
            is_landlord_company: true,
            claims_sum: Decimal::new(1500, 0),
            court_costs: Decimal::new(9999, 2),
            claims: "Deposit withheld without cause".into(),
            sender_first_name: None,
            sender_last_name: None,
        }
    }

    #[test]
    fn field_map_renders_currency_and_identity() {
        let owner = owner();
        let unit = unit(owner.id);
        let map = small_claims_field_map(&request(), &owner, &unit).unwrap();
        assert_eq!(map["claims_sum"].render().unwrap(), "$1500.00");
        assert_eq!(map["court_costs"].render().unwrap(), "$99.99");
        assert_eq!(map["total_amount"].render().unwrap(), "$1599.99");
        assert_eq!(map["plaintiff_name"].render().unwrap(), "Ann Renter");
        assert_eq!(map["defendant_name"].render().unwrap(), "Brick LLC");
        assert_eq!(map["defendant_is_company"].render().unwrap(), "X");
    }

    #[test]
    fn county_is_case_insensitive_but_must_exist() {
        let owner = owner();
        let unit = unit(owner.id);
        let mut req = request();
        req.county = "jefferson".into();
        let map = small_claims_field_map(&req, &owner, &unit).unwrap();
        assert_eq!(map["county"].render().unwrap(), "Jefferson");

        req.county = "Cook".into();
        let err = small_claims_field_map(&req, &owner, &unit).unwrap_err();
        assert!(matches!(
            err,
            RenterKitError::UnsupportedJurisdiction { county } if county == "Cook"
        ));
    }

    #[test]
    fn amounts_out_of_range_fail_not_clamp() {
        let owner = owner();
        let unit = unit(owner.id);

        let mut req = request();
        req.claims_sum = Decimal::new(250001, 2);
        let err = small_claims_field_map(&req, &owner, &unit).unwrap_err();
        assert!(matches!(
            err,
            RenterKitError::AmountOutOfRange { name, .. } if name == "claims_sum"
        ));

        let mut req = request();
        req.court_costs = Decimal::new(-1, 0);
        let err = small_claims_field_map(&req, &owner, &unit).unwrap_err();
        assert!(matches!(
            err,
            RenterKitError::AmountOutOfRange { name, .. } if name == "court_costs"
        ));
    }

    #[test]
    fn boundary_amount_is_accepted() {
        let owner = owner();
        let unit = unit(owner.id);
        let mut req = request();
        req.claims_sum = Decimal::from(CLAIM_LIMIT);
        let map = small_claims_field_map(&req, &owner, &unit).unwrap();
        assert_eq!(map["claims_sum"].render().unwrap(), "$2500.00");
    }
}
