// src/services/document_service.rs

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::BillingRepository,
    models::billing::Invoice,
};

// Função de dados -> bytes: não conhece HTTP nem transação, só monta o
// documento a partir do que o banco devolveu.
#[derive(Clone)]
pub struct DocumentService {
    billing_repo: BillingRepository,
}

impl DocumentService {
    pub fn new(billing_repo: BillingRepository) -> Self {
        Self { billing_repo }
    }

    /// Gera o recibo em PDF de uma fatura, para download pelo pagador.
    pub async fn generate_invoice_pdf(
        &self,
        invoice_id: Uuid,
        requester_user_id: Uuid,
    ) -> Result<Vec<u8>, AppError> {
        let invoice = self
            .billing_repo
            .find_invoice_by_id(invoice_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Fatura {}", invoice_id)))?;

        // Só o pagador (ou o emissor) baixa o recibo
        if invoice.payer_user_id != requester_user_id && invoice.creator_user_id != requester_user_id
        {
            return Err(AppError::Forbidden("A fatura pertence a outro usuário.".into()));
        }

        render_invoice_pdf(&invoice)
    }
}

fn render_invoice_pdf(invoice: &Invoice) -> Result<Vec<u8>, AppError> {
    // Carrega a fonte da pasta 'fonts/'
    let font_family = genpdf::fonts::from_files("./fonts", "Roboto", None)
        .map_err(|_| AppError::FontNotFound("Fonte não encontrada na pasta ./fonts".to_string()))?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(format!("Fatura {}", invoice.id));
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    doc.push(
        elements::Paragraph::new("PSICONECTA")
            .styled(style::Style::new().bold().with_font_size(18)),
    );
    doc.push(elements::Break::new(1.5));

    doc.push(
        elements::Paragraph::new(format!("FATURA {}", invoice.id))
            .styled(style::Style::new().bold().with_font_size(14)),
    );
    doc.push(elements::Paragraph::new(invoice.description.clone()));
    doc.push(elements::Paragraph::new(format!(
        "Vencimento: {}",
        invoice.due_date.format("%d/%m/%Y")
    )));

    doc.push(elements::Break::new(2));

    let mut total_paragraph =
        elements::Paragraph::new(format!("VALOR: R$ {:.2}", invoice.amount));
    total_paragraph.set_alignment(genpdf::Alignment::Right);
    doc.push(total_paragraph.styled(style::Style::new().bold().with_font_size(12)));

    doc.push(elements::Break::new(2));

    // --- ÁREA DE PAGAMENTO (QR CODE) ---
    // QR Code simples com a referência da fatura. Para "Pix Copia e Cola"
    // oficial (EMV BR Code) precisaríamos de uma lib de payload Pix.
    doc.push(
        elements::Paragraph::new("PAGAMENTO")
            .styled(style::Style::new().bold().with_font_size(12)),
    );
    doc.push(elements::Break::new(1));

    let payload = format!("psiconecta:fatura:{}:{}", invoice.id, invoice.amount);
    let code = QrCode::new(payload.as_bytes())
        .map_err(|e| AppError::PdfError(e.to_string()))?;

    // Renderiza para imagem e converte para genpdf::Image
    let image_buffer = code.render::<Luma<u8>>().build();
    let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);
    let pdf_image = genpdf::elements::Image::from_dynamic_image(dynamic_image)
        .map_err(|e| AppError::PdfError(e.to_string()))?
        .with_scale(genpdf::Scale::new(0.5, 0.5));

    doc.push(pdf_image);

    // Renderiza para buffer em memória
    let mut buffer = Vec::new();
    doc.render(&mut buffer)
        .map_err(|e| AppError::PdfError(e.to_string()))?;

    Ok(buffer)
}
