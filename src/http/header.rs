//! Protocol header construction for inbound submissions.
//!
//! The middleware's inbound interface expects an XI-style SOAP header part in
//! front of the raw payload part. The header carries the flow's addressing
//! quintuple, the generated message identifier, the delivery quality and, for
//! in-order delivery, the shared queue identifier.

use crate::config::{FlowDescriptor, QualityOfService};
use chrono::{DateTime, SecondsFormat, Utc};

/// Build the XI SOAP header part for one injected message.
pub fn build_xi_header(
    flow: &FlowDescriptor,
    message_id: &str,
    queue_id: Option<&str>,
    time_sent: DateTime<Utc>,
) -> String {
    let qos = match flow.quality_of_service {
        QualityOfService::Eo => "ExactlyOnce",
        QualityOfService::Eoio => "ExactlyOnceInOrder",
    };

    let queue_element = match queue_id {
        Some(id) => format!("\n      <sap:QueueId>{}</sap:QueueId>", xml_escape(id)),
        None => String::new(),
    };

    // With multi-mapping the middleware determines the receiver set itself, so
    // no static receiver block is sent.
    let receiver_element = if flow.using_multi_mapping {
        String::new()
    } else {
        format!(
            "\n      <sap:Receiver>\n        <sap:Party>{}</sap:Party>\n        <sap:Service>{}</sap:Service>\n      </sap:Receiver>",
            xml_escape(&flow.receiver.party),
            xml_escape(&flow.receiver.component)
        )
    };

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP:Envelope xmlns:SOAP="http://schemas.xmlsoap.org/soap/envelope/" xmlns:sap="http://sap.com/xi/XI/Message/30">
  <SOAP:Header>
    <sap:Main versionMajor="3" versionMinor="1" SOAP:mustUnderstand="1">
      <sap:MessageClass>ApplicationMessage</sap:MessageClass>
      <sap:ProcessingMode>asynchronous</sap:ProcessingMode>
      <sap:MessageId>{message_id}</sap:MessageId>
      <sap:TimeSent>{time_sent}</sap:TimeSent>
      <sap:Sender>
        <sap:Party>{sender_party}</sap:Party>
        <sap:Service>{sender_component}</sap:Service>
      </sap:Sender>{receiver_element}
      <sap:Interface namespace="{sender_namespace}">{sender_interface}</sap:Interface>
    </sap:Main>
    <sap:ReliableMessaging SOAP:mustUnderstand="1">
      <sap:QualityOfService>{qos}</sap:QualityOfService>{queue_element}
    </sap:ReliableMessaging>
  </SOAP:Header>
  <SOAP:Body/>
</SOAP:Envelope>"#,
        message_id = xml_escape(message_id),
        time_sent = time_sent.to_rfc3339_opts(SecondsFormat::Millis, true),
        sender_party = xml_escape(&flow.sender.party),
        sender_component = xml_escape(&flow.sender.component),
        receiver_element = receiver_element,
        sender_namespace = xml_escape(&flow.sender.namespace),
        sender_interface = xml_escape(&flow.sender.interface),
        qos = qos,
        queue_element = queue_element,
    )
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
