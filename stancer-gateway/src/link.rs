//! Pay-link markup shown on an invoice.

use bigdecimal::BigDecimal;
use html_escape::encode_double_quoted_attribute as attr;
use serde::Deserialize;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use common_money::MinorUnits;

const TEST_MODE_BANNER: &str = r#"<div class="alert alert-info top-margin-5 bottom-margin-5"><strong><span class="title">TEST MODE !</span></strong></div>"#;
const MISSING_KEYS_WARNING: &str = r#"<div class="alert alert-danger top-margin-5 bottom-margin-5"><strong><span class="title">Warning !</span></strong><br>API keys are not present in the configuration</div>"#;

#[derive(Debug, Clone, Deserialize)]
pub struct ClientDetails {
    pub email: String,
    pub firstname: String,
    pub lastname: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkParams {
    pub invoice_id: u64,
    pub amount: BigDecimal,
    pub currency: String,
    #[serde(default)]
    pub description: String,
    pub client: ClientDetails,
    #[serde(default = "default_pay_now")]
    pub pay_now_label: String,
}

fn default_pay_now() -> String {
    "Pay Now".to_string()
}

/// Fields the form posts to the checkout initiator, in submission order.
pub fn form_fields(params: &LinkParams) -> Result<Vec<(&'static str, String)>, GatewayError> {
    let amount = MinorUnits::from_major(&params.amount)?;
    Ok(vec![
        ("amount", amount.to_string()),
        ("currency", params.currency.trim().to_lowercase()),
        ("description", params.description.clone()),
        ("invoice_id", params.invoice_id.to_string()),
        ("email", params.client.email.clone()),
        (
            "customer",
            format!("{} {}", params.client.firstname, params.client.lastname),
        ),
    ])
}

/// Render the pay link. Blank active-mode keys yield a warning and no form.
pub fn render_payment_link(config: &GatewayConfig, params: &LinkParams) -> Result<String, GatewayError> {
    let mut html = String::new();
    if config.test_mode {
        html.push_str(TEST_MODE_BANNER);
    }
    if !config.credentials().is_complete() {
        html.push_str(MISSING_KEYS_WARNING);
        return Ok(html);
    }

    let fields = form_fields(params)?;
    html.push_str(&format!(
        r#"<form method="post" action="{}">"#,
        attr(&config.initiate_url())
    ));
    html.push_str(&format!(
        r#"<input class="btn btn-success btn-sm" type="submit" value="{}" />"#,
        attr(&params.pay_now_label)
    ));
    for (name, value) in fields {
        html.push_str(&format!(
            r#"<input type="hidden" name="{}" value="{}" />"#,
            name,
            attr(&value)
        ));
    }
    html.push_str("</form>");
    Ok(html)
}
