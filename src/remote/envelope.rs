//! SOAP envelopes for the partner login and metadata calls, and the minimal
//! field extraction needed to read their responses.

use std::fmt::Write as _;

use regex::Regex;

use super::{MetadataType, RetrieveRequest};

const ENVELOPE_OPEN: &str = r#"<?xml version="1.0" encoding="utf-8"?><env:Envelope xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:env="http://schemas.xmlsoap.org/soap/envelope/">"#;
const ENVELOPE_CLOSE: &str = "</env:Envelope>";
const METADATA_NS: &str = "http://soap.sforce.com/2006/04/metadata";

pub fn xml_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn xml_unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Matches `<tag>..</tag>` with any namespace prefix (`sf:`, none, ...)
fn tag_regex(tag: &str) -> Option<Regex> {
    Regex::new(&format!(
        r"(?s)<(?:\w+:)?{tag}(?:\s[^>]*)?>(.*?)</(?:\w+:)?{tag}>",
        tag = regex::escape(tag)
    ))
    .ok()
}

/// Text of the first `<tag>` element, unescaped
pub fn extract(body: &str, tag: &str) -> Option<String> {
    tag_regex(tag)?
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| xml_unescape(m.as_str().trim()))
}

/// Text of every `<tag>` element, in document order
pub fn extract_all(body: &str, tag: &str) -> Vec<String> {
    let Some(re) = tag_regex(tag) else {
        return Vec::new();
    };
    re.captures_iter(body)
        .filter_map(|c| c.get(1))
        .map(|m| xml_unescape(m.as_str().trim()))
        .collect()
}

/// `true` when `<tag>true</tag>` is present
pub fn extract_flag(body: &str, tag: &str) -> bool {
    extract(body, tag).is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

pub fn fault(body: &str) -> Option<String> {
    extract(body, "faultstring")
}

pub fn login(username: &str, password: &str) -> String {
    format!(
        r#"{ENVELOPE_OPEN}<env:Body><n1:login xmlns:n1="urn:partner.soap.sforce.com"><n1:username>{}</n1:username><n1:password>{}</n1:password></n1:login></env:Body>{ENVELOPE_CLOSE}"#,
        xml_escape(username),
        xml_escape(password)
    )
}

fn metadata_call(session_id: &str, body: &str) -> String {
    format!(
        r#"{ENVELOPE_OPEN}<env:Header><SessionHeader xmlns="{METADATA_NS}"><sessionId>{}</sessionId></SessionHeader></env:Header><env:Body>{body}</env:Body>{ENVELOPE_CLOSE}"#,
        xml_escape(session_id)
    )
}

pub fn deploy(session_id: &str, zip_base64: &str) -> String {
    metadata_call(
        session_id,
        &format!(
            r#"<deploy xmlns="{METADATA_NS}"><ZipFile>{zip_base64}</ZipFile><DeployOptions><rollbackOnError>true</rollbackOnError><singlePackage>false</singlePackage></DeployOptions></deploy>"#
        ),
    )
}

pub fn check_deploy_status(session_id: &str, job_id: &str) -> String {
    metadata_call(
        session_id,
        &format!(
            r#"<checkDeployStatus xmlns="{METADATA_NS}"><asyncProcessId>{}</asyncProcessId><includeDetails>true</includeDetails></checkDeployStatus>"#,
            xml_escape(job_id)
        ),
    )
}

fn types_xml(types: &[MetadataType]) -> String {
    let mut out = String::new();
    for t in types {
        out.push_str("<types>");
        for member in &t.members {
            let _ = write!(out, "<members>{}</members>", xml_escape(member));
        }
        let _ = write!(out, "<name>{}</name>", xml_escape(&t.name));
        out.push_str("</types>");
    }
    out
}

pub fn retrieve(session_id: &str, request: &RetrieveRequest) -> String {
    metadata_call(
        session_id,
        &format!(
            r#"<retrieve xmlns="{METADATA_NS}"><retrieveRequest><apiVersion>{}</apiVersion><singlePackage>true</singlePackage><unpackaged>{}</unpackaged></retrieveRequest></retrieve>"#,
            xml_escape(&request.api_version),
            types_xml(&request.types)
        ),
    )
}

pub fn check_retrieve_status(session_id: &str, job_id: &str) -> String {
    metadata_call(
        session_id,
        &format!(
            r#"<checkRetrieveStatus xmlns="{METADATA_NS}"><asyncProcessId>{}</asyncProcessId><includeZip>true</includeZip></checkRetrieveStatus>"#,
            xml_escape(job_id)
        ),
    )
}
