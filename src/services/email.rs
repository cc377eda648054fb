// src/services/email.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Dados de template do e-mail de fatura emitida.
#[derive(Debug, Clone)]
pub struct InvoiceEmailData {
    pub invoice_id: Uuid,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub patient_name: String,
}

/// Canal secundário de entrega, sempre best-effort: quem chama captura e
/// loga a falha, nunca a propaga para o fluxo que já foi commitado.
#[async_trait]
pub trait EmailNotifier: Send + Sync {
    async fn send_invoice_issued(&self, to: &str, data: &InvoiceEmailData) -> anyhow::Result<()>;
}

/// Implementação padrão: registra o envio no log. O provedor SMTP real
/// entra por trás deste trait sem tocar no resto do código.
pub struct LoggingEmailNotifier;

#[async_trait]
impl EmailNotifier for LoggingEmailNotifier {
    async fn send_invoice_issued(&self, to: &str, data: &InvoiceEmailData) -> anyhow::Result<()> {
        tracing::info!(
            to = %to,
            invoice_id = %data.invoice_id,
            amount = %data.amount,
            due_date = %data.due_date,
            "📧 E-mail de fatura emitida"
        );
        Ok(())
    }
}
