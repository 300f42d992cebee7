//! ISO 20022 export
//!
//! Fixed `pain.001`-flavoured document describing one wallet snapshot. Not a
//! schema-valid payment initiation; a structured report downstream systems
//! can ingest.

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Write;

use crate::models::types::WalletSnapshot;
use crate::utils::constants::{ISO_CREDITOR_NAME, ISO_MSG_ID_PREFIX};

/// Escape the five XML special characters
pub fn xml_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // XML 1.0 forbids most control characters
            c if (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r') => {}
            c => out.push(c),
        }
    }
    out
}

/// Render the export for `snapshot`, stamped with `now`.
///
/// `submitted` is the address exactly as the caller typed it; it names the
/// debtor, while `MsgId` carries the canonical form.
pub fn generate_iso_xml(snapshot: &WalletSnapshot, submitted: &str, now: DateTime<Utc>) -> String {
    let address = xml_escape(&snapshot.address);
    let debtor = xml_escape(submitted.trim());
    let remittance = xml_escape(&format!(
        "Wallet Risk Validation Report | Chain: {} | Risk Score: {}/100 ({}) | Status: {}",
        snapshot.chain_name,
        snapshot.risk_score,
        snapshot.risk_level.as_str(),
        snapshot.status.as_str()
    ));

    let mut xml = String::with_capacity(1024);
    // Writing into a String cannot fail
    let _ = write!(
        xml,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Document xmlns="urn:iso:std:iso:20022:tech:xsd:pain.001.001.09">
  <CstmrCdtTrfInitn>
    <GrpHdr>
      <MsgId>{prefix}{address}</MsgId>
      <CreDtTm>{created}</CreDtTm>
      <NbOfTxs>1</NbOfTxs>
    </GrpHdr>
    <PmtInf>
      <Dbtr>
        <Nm>{debtor}</Nm>
      </Dbtr>
      <Cdtr>
        <Nm>{creditor}</Nm>
      </Cdtr>
      <Amt Ccy="{ccy}">{balance}</Amt>
      <RmtInf>
        <Ustrd>{remittance}</Ustrd>
      </RmtInf>
    </PmtInf>
  </CstmrCdtTrfInitn>
</Document>
"#,
        prefix = ISO_MSG_ID_PREFIX,
        address = address,
        debtor = debtor,
        created = now.to_rfc3339_opts(SecondsFormat::Secs, true),
        creditor = xml_escape(ISO_CREDITOR_NAME),
        ccy = xml_escape(&snapshot.symbol),
        balance = snapshot.balance.normalize(),
        remittance = remittance,
    );
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::{Chain, FetchedAccount};
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()
    }

    #[test]
    fn test_escape() {
        assert_eq!(xml_escape("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&apos;");
        assert_eq!(xml_escape("x\u{0}y"), "xy");
    }

    #[test]
    fn test_document_fields() {
        let account = FetchedAccount::new(Decimal::new(15, 1));
        let snapshot = WalletSnapshot::from_account("TJRabPrwbZy45sbavfcjinPJC18kjpRTv8", Chain::Tron, account, "tronscan");
        let xml = generate_iso_xml(&snapshot, "TJRabPrwbZy45sbavfcjinPJC18kjpRTv8", fixed_now());

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<MsgId>WS-TJRabPrwbZy45sbavfcjinPJC18kjpRTv8</MsgId>"));
        assert!(xml.contains("<CreDtTm>2024-05-06T07:08:09Z</CreDtTm>"));
        assert!(xml.contains("<Nm>Wallet Sentry Validator</Nm>"));
        assert!(xml.contains("<Amt Ccy=\"TRX\">1.5</Amt>"));
        assert!(xml.contains("Chain: TRON"));
    }

    #[test]
    fn test_debtor_keeps_submitted_case() {
        let raw = "0xDAC17F958D2ee523a2206206994597C13D831ec7";
        let canonical = raw.to_ascii_lowercase();
        let account = FetchedAccount::new(Decimal::ONE);
        let snapshot = WalletSnapshot::from_account(&canonical, Chain::Ethereum, account, "cloudflare");
        let xml = generate_iso_xml(&snapshot, &format!("  {} ", raw), fixed_now());

        assert!(xml.contains(&format!("<Nm>{}</Nm>", raw)));
        assert!(xml.contains(&format!("<MsgId>WS-{}</MsgId>", canonical)));
    }

    #[test]
    fn test_hostile_address_is_escaped() {
        let snapshot = WalletSnapshot::invalid_format("<script>&");
        let xml = generate_iso_xml(&snapshot, "<script>&", fixed_now());
        assert!(xml.contains("&lt;script&gt;&amp;"));
        assert!(!xml.contains("<script>"));
    }
}
