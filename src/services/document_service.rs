// src/services/document_service.rs

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    models::energy::{InvoiceView, TariffGroup},
};

/// Contenido del QR: identifica la factura sin exponer montos editables.
pub(crate) fn invoice_qr_payload(view: &InvoiceView) -> String {
    format!(
        "SIGO|FACTURA|{}|SERVICIO:{}|PERIODO:{}|TOTAL:{}",
        view.invoice.id,
        view.service_number,
        view.invoice.billing_period,
        view.invoice.total_due.round_dp(2)
    )
}

fn money(value: Decimal) -> String {
    format!("$ {:.2}", value)
}

fn pdf_error(e: impl std::fmt::Display) -> AppError {
    AppError::InternalServerError(anyhow::anyhow!("Error al generar el PDF: {}", e))
}

#[derive(Clone)]
pub struct DocumentService {
    fonts_dir: String,
}

impl DocumentService {
    pub fn new(fonts_dir: String) -> Self {
        Self { fonts_dir }
    }

    /// Ficha PDF de una factura con sus importes y un QR de referencia.
    pub fn invoice_pdf(&self, view: &InvoiceView) -> Result<Vec<u8>, AppError> {
        let invoice = &view.invoice;

        let font_family = genpdf::fonts::from_files(&self.fonts_dir, "Roboto", None)
            .map_err(|_| AppError::FontNotFound(self.fonts_dir.clone()))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Factura {}", invoice.billing_period));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(12);
        doc.set_page_decorator(decorator);

        // --- Encabezado ---
        doc.push(
            elements::Paragraph::new("SISTEMA DE GESTIÓN - FICHA DE FACTURA CFE")
                .styled(style::Style::new().bold().with_font_size(16)),
        );
        doc.push(elements::Paragraph::new(format!("Unidad Responsable: {}", view.org_unit_name)));
        doc.push(elements::Paragraph::new(format!(
            "Servicio: {}   Medidor: {}   Tarifa: {}",
            view.service_number,
            view.meter_number,
            invoice.tariff_type.as_str()
        )));
        doc.push(elements::Paragraph::new(format!(
            "Periodo: {} ({} días)",
            invoice.billing_period, invoice.period_days
        )));
        doc.push(elements::Break::new(1.5));

        // --- Importes ---
        let mut rows: Vec<(&str, String)> = vec![
            ("Consumo (kWh)", format!("{:.2}", invoice.consumption_kwh)),
            ("Cargo por energía", money(invoice.energy_charge)),
            ("Importe demanda máxima", money(invoice.max_demand_amount)),
            ("DAP", money(invoice.dap)),
            ("IVA", money(invoice.vat)),
        ];
        if invoice.tariff_type.group() == TariffGroup::Triple {
            let text = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());
            rows.extend([
                ("Demanda máxima (kW)", text(invoice.max_demand.map(|v| v.to_string()))),
                ("Factor de potencia", text(invoice.power_factor.map(|v| format!("{:.2}", v)))),
                ("Factor de carga (%)", text(invoice.load_factor.map(|v| v.to_string()))),
                ("Importe BT", text(invoice.bt_amount.map(money))),
                ("Importe FP", text(invoice.pf_amount.map(money))),
            ]);
        }

        let mut table = elements::TableLayout::new(vec![3, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let style_bold = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("Concepto").styled(style_bold))
            .element(elements::Paragraph::new("Valor").styled(style_bold))
            .push()
            .map_err(pdf_error)?;

        for (label, value) in rows {
            table
                .row()
                .element(elements::Paragraph::new(label))
                .element(elements::Paragraph::new(value))
                .push()
                .map_err(pdf_error)?;
        }
        doc.push(table);
        doc.push(elements::Break::new(1.5));

        let mut total = elements::Paragraph::new(format!("TOTAL A PAGAR: {}", money(invoice.total_due)));
        total.set_alignment(genpdf::Alignment::Right);
        doc.push(total.styled(style::Style::new().bold().with_font_size(13)));

        let due = invoice
            .due_date
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "-".to_string());
        doc.push(elements::Paragraph::new(format!(
            "Estatus: {}   Vencimiento: {}",
            invoice.status.label(),
            due
        )));
        doc.push(elements::Break::new(2));

        // --- QR de referencia ---
        let code = QrCode::new(invoice_qr_payload(view).as_bytes()).map_err(pdf_error)?;
        let image_buffer = code.render::<Luma<u8>>().build();
        let qr = elements::Image::from_dynamic_image(image::DynamicImage::ImageLuma8(image_buffer))
            .map_err(pdf_error)?
            .with_scale(genpdf::Scale::new(0.5, 0.5));
        doc.push(qr);

        if let Some(name) = &view.created_by_name {
            doc.push(elements::Break::new(1));
            doc.push(
                elements::Paragraph::new(format!(
                    "Registrada por {} el {}",
                    name,
                    invoice.created_at.format("%d/%m/%Y")
                ))
                .styled(style::Style::new().italic().with_font_size(8)),
            );
        }

        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(pdf_error)?;

        tracing::info!("📄 PDF de factura {} generado ({} bytes)", invoice.id, buffer.len());
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::energy::{Invoice, InvoiceStatus, TariffCode};
    use chrono::Utc;
    use uuid::Uuid;

    fn view() -> InvoiceView {
        InvoiceView {
            invoice: Invoice {
                id: Uuid::new_v4(),
                tariff_type: TariffCode::Gdmth,
                substation_id: Uuid::new_v4(),
                period_days: 30,
                billing_period: "01/04/2025 - 30/04/2025".into(),
                consumption_kwh: Decimal::from(5000),
                energy_charge: Decimal::from(9000),
                max_demand_amount: Decimal::from(1200),
                dap: Decimal::from(300),
                vat: Decimal::new(168000, 2),
                total_due: Decimal::new(1218000, 2),
                max_demand: Some(80),
                power_factor: None,
                load_factor: Some(70),
                bt_amount: None,
                pf_amount: None,
                due_date: None,
                status: InvoiceStatus::NoPagada,
                created_by: None,
                updated_by: None,
                updated_at: None,
                created_at: Utc::now(),
            },
            service_number: 112233,
            meter_number: "MT-4".into(),
            org_unit_id: Uuid::new_v4(),
            org_unit_name: "Biblioteca Central".into(),
            created_by_name: None,
        }
    }

    #[test]
    fn qr_payload_references_the_invoice() {
        let v = view();
        let payload = invoice_qr_payload(&v);
        assert!(payload.starts_with("SIGO|FACTURA|"));
        assert!(payload.contains(&v.invoice.id.to_string()));
        assert!(payload.contains("SERVICIO:112233"));
        assert!(payload.ends_with("TOTAL:12180.00"));
    }

    #[test]
    fn missing_fonts_are_reported() {
        let service = DocumentService::new("/ruta/que/no/existe".into());
        assert!(matches!(service.invoice_pdf(&view()), Err(AppError::FontNotFound(_))));
    }

    #[test]
    fn money_has_two_decimals() {
        assert_eq!(money(Decimal::new(15, 1)), "$ 1.50");
    }
}
