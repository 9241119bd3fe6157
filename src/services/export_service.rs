// src/services/export_service.rs

use rust_decimal::{prelude::ToPrimitive, Decimal};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};

use crate::{
    common::error::AppError,
    models::{
        energy::{InvoiceView, TariffGroup},
        inventory::{InventoryDetails, InventoryKind, InventoryListResponse},
    },
};

const INVOICE_HEADER_COLOR: u32 = 0x4F81BD;
const INVENTORY_HEADER_COLOR: u32 = 0x305496;

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Number(Decimal),
    Empty,
}

impl Cell {
    fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    fn opt_text(value: Option<&str>) -> Self {
        value.map_or(Cell::Empty, |v| Cell::text(v))
    }

    fn opt_number(value: Option<Decimal>) -> Self {
        value.map_or(Cell::Empty, Cell::Number)
    }
}

// Hoja lista para escribirse: encabezados, filas y (opcional) fila de totales en negritas
struct Sheet {
    name: String,
    header_color: u32,
    headers: Vec<&'static str>,
    rows: Vec<Vec<Cell>>,
    totals: Option<Vec<Cell>>,
}

// ---
// Facturas
// ---

fn invoice_sheet(group: TariffGroup, invoices: &[InvoiceView]) -> Sheet {
    let mut headers = vec![
        "UR", "Tarifa", "No. Servicio", "Medidor", "Periodo", "Días", "Consumo (kWh)", "Cargo energía",
        "Importe demanda máx.", "DAP", "IVA", "Total a pagar",
    ];
    if group == TariffGroup::Triple {
        headers.extend(["Demanda máx.", "Factor de potencia", "Factor de carga", "Importe BT", "Importe FP"]);
    }
    headers.extend(["Vencimiento", "Estatus", "Fecha de registro", "Registró"]);

    let rows = invoices
        .iter()
        .filter(|v| v.invoice.tariff_type.group() == group)
        .map(|v| {
            let i = &v.invoice;
            let mut row = vec![
                Cell::text(&v.org_unit_name),
                Cell::text(i.tariff_type.as_str()),
                Cell::Number(Decimal::from(v.service_number)),
                Cell::text(&v.meter_number),
                Cell::text(&i.billing_period),
                Cell::Number(Decimal::from(i.period_days)),
                Cell::Number(i.consumption_kwh),
                Cell::Number(i.energy_charge),
                Cell::Number(i.max_demand_amount),
                Cell::Number(i.dap),
                Cell::Number(i.vat),
                Cell::Number(i.total_due),
            ];
            if group == TariffGroup::Triple {
                row.extend([
                    Cell::opt_number(i.max_demand.map(Decimal::from)),
                    Cell::opt_number(i.power_factor),
                    Cell::opt_number(i.load_factor.map(Decimal::from)),
                    Cell::opt_number(i.bt_amount),
                    Cell::opt_number(i.pf_amount),
                ]);
            }
            row.extend([
                i.due_date
                    .map_or(Cell::Empty, |d| Cell::text(d.format("%d/%m/%Y").to_string())),
                Cell::text(i.status.label()),
                Cell::text(i.created_at.format("%d/%m/%Y").to_string()),
                Cell::opt_text(v.created_by_name.as_deref()),
            ]);
            row
        })
        .collect();

    let name = match group {
        TariffGroup::Pdbt => "Facturas PDBT",
        TariffGroup::Triple => "Facturas GDMTH-GDMTO-GDBT",
    };

    Sheet {
        name: name.to_string(),
        header_color: INVOICE_HEADER_COLOR,
        headers,
        rows,
        totals: None,
    }
}

// ---
// Inventarios
// ---

fn inventory_sheet(kind: InventoryKind, data: &InventoryListResponse) -> Sheet {
    let mut headers = vec!["UR", "Edificio", "Nivel", "Área"];
    headers.extend(match kind {
        InventoryKind::Climatizacion => {
            vec!["Tipo", "Marca", "Modelo", "Capacidad (BTU)", "Voltaje", "Amperaje", "Potencia (W)"]
        }
        InventoryKind::Luminarias => vec!["Tipo de lámpara", "Luminarias", "Lámparas por luminaria", "Watts por lámpara"],
        InventoryKind::Miscelaneos => vec!["Descripción", "Marca", "Modelo", "Voltaje", "Amperaje"],
    });
    headers.extend(["Potencia total (kW)", "Horas al mes", "Consumo mensual (kWh)"]);

    let rows: Vec<Vec<Cell>> = data
        .records
        .iter()
        .filter(|r| r.record.kind == kind)
        .map(|r| {
            let mut row = vec![
                Cell::text(&r.org_unit_name),
                Cell::text(&r.building_name),
                Cell::text(r.record.level.label()),
                Cell::text(&r.area_name),
            ];
            match &r.record.details.0 {
                InventoryDetails::Climatizacion(d) => row.extend([
                    Cell::text(&d.hvac_type),
                    Cell::opt_text(d.brand.as_deref()),
                    Cell::opt_text(d.model.as_deref()),
                    Cell::opt_number(d.capacity.map(Decimal::from)),
                    Cell::opt_number(d.voltage),
                    Cell::opt_number(d.amperage),
                    Cell::opt_number(d.power),
                ]),
                InventoryDetails::Luminarias(d) => row.extend([
                    Cell::text(&d.lamp_type),
                    Cell::Number(Decimal::from(d.fixtures)),
                    Cell::Number(Decimal::from(d.lamps_per_fixture)),
                    Cell::Number(d.lamp_watts),
                ]),
                InventoryDetails::Miscelaneos(d) => row.extend([
                    Cell::text(&d.description),
                    Cell::opt_text(d.brand.as_deref()),
                    Cell::opt_text(d.model.as_deref()),
                    Cell::Number(d.voltage),
                    Cell::Number(d.amperage),
                ]),
            }
            row.extend([
                Cell::Number(r.record.total_power_kw),
                Cell::Number(r.record.monthly_hours),
                Cell::Number(r.record.monthly_consumption),
            ]);
            row
        })
        .collect();

    // Totales bajo las tres últimas columnas
    let mut totals = vec![Cell::Empty; headers.len() - 3];
    totals[0] = Cell::text("TOTAL");
    totals.extend([
        Cell::Number(data.totals.total_power_kw),
        Cell::Number(data.totals.monthly_hours),
        Cell::Number(data.totals.monthly_consumption),
    ]);

    Sheet {
        name: format!("Inventario {}", kind.label()),
        header_color: INVENTORY_HEADER_COLOR,
        headers,
        rows,
        totals: Some(totals),
    }
}

// ---
// Escritura del libro
// ---

fn render(sheet: &Sheet) -> Result<Vec<u8>, AppError> {
    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(sheet.header_color))
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center);
    let body_format = Format::new().set_border(FormatBorder::Thin);
    let totals_format = Format::new().set_bold().set_border(FormatBorder::Thin);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&sheet.name)?;

    for (col, header) in sheet.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    let body = sheet.rows.iter().map(|row| (row, &body_format));
    let totals = sheet.totals.iter().map(|row| (row, &totals_format));

    for (index, (row, format)) in body.chain(totals).enumerate() {
        let row_num = (index + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(text) => {
                    worksheet.write_string_with_format(row_num, col, text.as_str(), format)?;
                }
                Cell::Number(value) => {
                    worksheet.write_number_with_format(row_num, col, value.to_f64().unwrap_or_default(), format)?;
                }
                Cell::Empty => {
                    worksheet.write_blank(row_num, col, format)?;
                }
            }
        }
    }

    worksheet.autofit();
    Ok(workbook.save_to_buffer()?)
}

#[derive(Clone, Default)]
pub struct ExportService;

impl ExportService {
    pub fn new() -> Self {
        Self
    }

    pub fn invoices_xlsx(&self, group: TariffGroup, invoices: &[InvoiceView]) -> Result<Vec<u8>, AppError> {
        let sheet = invoice_sheet(group, invoices);
        tracing::info!("📊 Exportando {} facturas ({})", sheet.rows.len(), sheet.name);
        render(&sheet)
    }

    pub fn inventory_xlsx(&self, kind: InventoryKind, data: &InventoryListResponse) -> Result<Vec<u8>, AppError> {
        let sheet = inventory_sheet(kind, data);
        tracing::info!("📊 Exportando {} registros ({})", sheet.rows.len(), sheet.name);
        render(&sheet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        energy::{Invoice, InvoiceStatus, TariffCode},
        inventory::{FloorLevel, InventoryRecord, InventoryRecordView, InventoryTotals, MiscDetails},
    };
    use chrono::Utc;
    use sqlx::types::Json;
    use uuid::Uuid;

    fn invoice(tariff: TariffCode) -> InvoiceView {
        InvoiceView {
            invoice: Invoice {
                id: Uuid::new_v4(),
                tariff_type: tariff,
                substation_id: Uuid::new_v4(),
                period_days: 31,
                billing_period: "01/03/2025 - 31/03/2025".into(),
                consumption_kwh: Decimal::from(2400),
                energy_charge: Decimal::new(512050, 2),
                max_demand_amount: Decimal::ZERO,
                dap: Decimal::from(150),
                vat: Decimal::new(81928, 2),
                total_due: Decimal::new(608978, 2),
                max_demand: None,
                power_factor: None,
                load_factor: None,
                bt_amount: None,
                pf_amount: None,
                due_date: None,
                status: InvoiceStatus::default_for(tariff),
                created_by: None,
                updated_by: None,
                updated_at: None,
                created_at: Utc::now(),
            },
            service_number: 445566,
            meter_number: "X-9".into(),
            org_unit_id: Uuid::new_v4(),
            org_unit_name: "Facultad de Ingeniería".into(),
            created_by_name: Some("Ana López".into()),
        }
    }

    fn misc_record(consumption: i64) -> InventoryRecordView {
        InventoryRecordView {
            record: InventoryRecord {
                id: Uuid::new_v4(),
                kind: InventoryKind::Miscelaneos,
                org_unit_id: Uuid::new_v4(),
                building_id: Uuid::new_v4(),
                level: FloorLevel::GroundFloor,
                area_id: Uuid::new_v4(),
                period_id: Uuid::new_v4(),
                details: Json(InventoryDetails::Miscelaneos(MiscDetails {
                    description: "Cafetera".into(),
                    brand: None,
                    model: None,
                    voltage: Decimal::from(127),
                    amperage: Decimal::from(8),
                })),
                total_power_kw: Decimal::new(1016, 3),
                monthly_hours: Decimal::from(20),
                monthly_consumption: Decimal::from(consumption),
                created_by: None,
                updated_by: None,
                updated_at: None,
                active: true,
                deactivated_at: None,
                deactivated_by: None,
                reactivated_at: None,
                reactivated_by: None,
                created_at: Utc::now(),
            },
            org_unit_name: "Rectoría".into(),
            building_name: "Edificio A".into(),
            area_name: "Cocineta".into(),
            period_name: "PERIODO_001".into(),
            created_by_name: None,
        }
    }

    #[test]
    fn triple_sheet_adds_its_columns_and_skips_pdbt_rows() {
        let invoices = vec![invoice(TariffCode::Pdbt), invoice(TariffCode::Gdmth), invoice(TariffCode::Gdbt)];

        let pdbt = invoice_sheet(TariffGroup::Pdbt, &invoices);
        let triple = invoice_sheet(TariffGroup::Triple, &invoices);

        assert_eq!(pdbt.rows.len(), 1);
        assert_eq!(triple.rows.len(), 2);
        assert_eq!(triple.headers.len(), pdbt.headers.len() + 5);
        assert!(triple.rows.iter().all(|r| r.len() == triple.headers.len()));
    }

    #[test]
    fn inventory_sheet_ends_with_totals_row() {
        let records = vec![misc_record(20), misc_record(30)];
        let totals = InventoryTotals::from_records(records.iter().map(|r| &r.record));
        let data = InventoryListResponse { records, totals };

        let sheet = inventory_sheet(InventoryKind::Miscelaneos, &data);
        let totals_row = sheet.totals.as_ref().unwrap();

        assert_eq!(totals_row.len(), sheet.headers.len());
        assert_eq!(totals_row[0], Cell::text("TOTAL"));
        assert_eq!(totals_row.last(), Some(&Cell::Number(Decimal::from(50))));
    }

    #[test]
    fn workbook_is_a_zip_container() {
        let bytes = ExportService::new()
            .invoices_xlsx(TariffGroup::Pdbt, &[invoice(TariffCode::Pdbt)])
            .unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
