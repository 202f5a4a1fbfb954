// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transfer QR image URLs.
//!
//! The image itself is rendered by an external VietQR-style service; this
//! module only builds `{base}/{bank}-{account}-{template}.png?amount=..&addInfo=<code>`.

use relaydesk_config::model::BillingConfig;
use relaydesk_core::RelaydeskError;
use url::Url;

#[derive(Debug, Clone)]
pub struct QrImageBuilder {
    base: Url,
    bank_id: String,
    account_number: String,
    template: String,
}

impl QrImageBuilder {
    pub fn from_config(config: &BillingConfig) -> Result<Self, RelaydeskError> {
        let mut base = Url::parse(&config.qr_base_url).map_err(|e| {
            RelaydeskError::Config(format!("billing.qr_base_url is not a URL: {e}"))
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            base,
            bank_id: config.bank_id.clone(),
            account_number: config.account_number.clone(),
            template: config.qr_template.clone(),
        })
    }

    /// None when no receiving account is configured.
    pub fn image_url(&self, amount: i64, code: &str) -> Option<String> {
        if self.account_number.is_empty() {
            return None;
        }
        let file = format!(
            "{}-{}-{}.png",
            self.bank_id, self.account_number, self.template
        );
        let mut url = self.base.join(&file).ok()?;
        url.query_pairs_mut()
            .append_pair("amount", &amount.to_string())
            .append_pair("addInfo", code);
        Some(url.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_vietqr_url() {
        let config = BillingConfig {
            account_number: "0344927528".into(),
            ..BillingConfig::default()
        };
        let qr = QrImageBuilder::from_config(&config).unwrap();
        assert_eq!(
            qr.image_url(10_000, "RD261018ABCDEFGH").unwrap(),
            "https://img.vietqr.io/image/MB-0344927528-qr_only.png?amount=10000&addInfo=RD261018ABCDEFGH"
        );
    }

    #[test]
    fn no_account_means_no_url() {
        let qr = QrImageBuilder::from_config(&BillingConfig::default()).unwrap();
        assert!(qr.image_url(10_000, "RD1").is_none());
    }
}
