use std::{
    collections::{HashMap, HashSet},
    str::FromStr as _,
};

use fractic_server_error::ServerError;
use rust_decimal::Decimal;

use crate::{
    data::models::{
        code_model::{DocumentStatusModel, PaymentStatusModel, ProductTypeModel},
        decimal_amount_model::DecimalAmountModel,
        iso_currency_model::ISOCurrencyModel,
        iso_date_model::ISODateModel,
    },
    entities::{
        invoice, invoice_line, mechanic, product, sale_order, seller, InvoiceDocument,
        InvoiceLine, SaleOrder, SaleOrderLine,
    },
    errors::{
        DuplicateDocument, DuplicateDocumentLine, InvalidCsv, InvalidCsvContent,
        OrphanDocumentLine,
    },
};

pub(crate) trait DocumentsCsvDatasource {
    fn invoices_from_string(
        &self,
        invoices_csv: &str,
        lines_csv: &str,
    ) -> Result<Vec<InvoiceDocument>, ServerError>;

    fn sale_orders_from_string(
        &self,
        orders_csv: &str,
        lines_csv: &str,
    ) -> Result<Vec<SaleOrder>, ServerError>;
}

pub(crate) struct DocumentsCsvDatasourceImpl;

/// Columns shared by invoice lines and sale order lines, after the parent
/// document id.
struct RawLine {
    document_id: String,
    line_id: String,
    product_ref: String,
    product_name: String,
    product_type: ProductTypeModel,
    quantity: Decimal,
    mechanic: Option<String>,
    line_base_amount: Decimal,
}

fn optional(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn required<'a>(raw: &'a str, column: &str, row: usize) -> Result<&'a str, ServerError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(InvalidCsvContent::new(&format!(
            "row {} is missing '{}'",
            row + 1,
            column
        )))
    } else {
        Ok(trimmed)
    }
}

fn parse_lines(s: &str) -> Result<Vec<RawLine>, ServerError> {
    csv::Reader::from_reader(s.as_bytes())
        .records()
        .enumerate()
        .map(|(i, r)| {
            r.map_err(|e| InvalidCsv::with_debug(&e)).and_then(|r| {
                // Extract from CSV record.
                let raw_document = r.get(0).unwrap_or("");
                let raw_line = r.get(1).unwrap_or("");
                let raw_product_ref = r.get(2).unwrap_or("");
                let raw_product_name = r.get(3).unwrap_or("");
                let raw_product_type = r.get(4).unwrap_or("");
                let raw_quantity = r.get(5).unwrap_or("0");
                let raw_mechanic = r.get(6).unwrap_or("");
                let raw_base = r.get(7).unwrap_or("0");

                // Parse.
                Ok(RawLine {
                    document_id: required(raw_document, "document id", i)?.to_string(),
                    line_id: required(raw_line, "line_id", i)?.to_string(),
                    product_ref: raw_product_ref.trim().to_string(),
                    product_name: raw_product_name.trim().to_string(),
                    product_type: ProductTypeModel::from_str(raw_product_type)?,
                    quantity: DecimalAmountModel::from_str(raw_quantity)?.into(),
                    mechanic: optional(raw_mechanic),
                    line_base_amount: DecimalAmountModel::from_str(raw_base)?.into(),
                })
            })
        })
        .collect()
}

/// Groups lines under their document, keeping file order. Fails on lines
/// pointing at documents that were not declared and on line ids repeated
/// within one document.
fn group_lines<T>(
    lines: Vec<RawLine>,
    known: &HashMap<String, usize>,
    build: impl Fn(RawLine) -> T,
) -> Result<Vec<Vec<T>>, ServerError> {
    let mut grouped: Vec<Vec<T>> = (0..known.len()).map(|_| Vec::new()).collect();
    let mut seen: HashSet<(String, String)> = HashSet::new();
    for line in lines {
        let Some(&index) = known.get(&line.document_id) else {
            return Err(OrphanDocumentLine::new(&line.line_id, &line.document_id));
        };
        if !seen.insert((line.document_id.clone(), line.line_id.clone())) {
            return Err(DuplicateDocumentLine::new(&line.line_id, &line.document_id));
        }
        grouped[index].push(build(line));
    }
    Ok(grouped)
}

fn index_ids<'a>(ids: impl Iterator<Item = &'a str>) -> Result<HashMap<String, usize>, ServerError> {
    let mut index = HashMap::new();
    for (i, id) in ids.enumerate() {
        if index.insert(id.to_string(), i).is_some() {
            return Err(DuplicateDocument::new(id));
        }
    }
    Ok(index)
}

impl DocumentsCsvDatasource for DocumentsCsvDatasourceImpl {
    fn invoices_from_string(
        &self,
        invoices_csv: &str,
        lines_csv: &str,
    ) -> Result<Vec<InvoiceDocument>, ServerError> {
        let mut invoices = csv::Reader::from_reader(invoices_csv.as_bytes())
            .records()
            .enumerate()
            .map(|(i, r)| {
                r.map_err(|e| InvalidCsv::with_debug(&e)).and_then(|r| {
                    // Extract from CSV record.
                    let raw_id = r.get(0).unwrap_or("");
                    let raw_name = r.get(1).unwrap_or("");
                    let raw_partner = r.get(2).unwrap_or("");
                    let raw_status = r.get(3).unwrap_or("");
                    let raw_payment_status = r.get(4).unwrap_or("");
                    let raw_date = r.get(5).unwrap_or("");
                    let raw_salesperson = r.get(6).unwrap_or("");
                    let raw_base = r.get(7).unwrap_or("0");
                    let raw_currency = r.get(8).unwrap_or("");

                    // Parse.
                    let id = required(raw_id, "id", i)?;
                    let status = DocumentStatusModel::from_str(raw_status)?;
                    let payment_status = PaymentStatusModel::from_str(raw_payment_status)?;
                    let date = ISODateModel::from_str(raw_date)?;
                    let base_amount = DecimalAmountModel::from_str(raw_base)?;
                    let currency = ISOCurrencyModel::from_str(raw_currency)?;

                    // Build.
                    Ok(InvoiceDocument {
                        id: invoice(id),
                        name: raw_name.trim().to_string(),
                        partner_name: raw_partner.trim().to_string(),
                        status: status.0,
                        payment_status: payment_status.0,
                        date: date.into(),
                        salesperson: optional(raw_salesperson).map(seller),
                        base_amount: base_amount.into(),
                        currency: currency.into(),
                        lines: Vec::new(),
                        commission_percent: Decimal::ZERO,
                        commission_amount: Decimal::ZERO,
                    })
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let known = index_ids(invoices.iter().map(|d| d.id.as_str()))?;
        let grouped = group_lines(parse_lines(lines_csv)?, &known, |l| InvoiceLine {
            id: invoice_line(l.line_id),
            product_ref: product(l.product_ref),
            product_name: l.product_name,
            product_type: l.product_type.0,
            quantity: l.quantity,
            mechanic: l.mechanic.map(mechanic),
            line_base_amount: l.line_base_amount,
        })?;
        for (doc, lines) in invoices.iter_mut().zip(grouped) {
            doc.lines = lines;
        }
        Ok(invoices)
    }

    fn sale_orders_from_string(
        &self,
        orders_csv: &str,
        lines_csv: &str,
    ) -> Result<Vec<SaleOrder>, ServerError> {
        let mut orders = csv::Reader::from_reader(orders_csv.as_bytes())
            .records()
            .enumerate()
            .map(|(i, r)| {
                r.map_err(|e| InvalidCsv::with_debug(&e)).and_then(|r| {
                    // Extract from CSV record.
                    let raw_id = r.get(0).unwrap_or("");
                    let raw_name = r.get(1).unwrap_or("");
                    let raw_partner = r.get(2).unwrap_or("");
                    let raw_salesperson = r.get(3).unwrap_or("");
                    let raw_base = r.get(4).unwrap_or("0");
                    let raw_currency = r.get(5).unwrap_or("");

                    // Parse.
                    let id = required(raw_id, "id", i)?;
                    let base_amount = DecimalAmountModel::from_str(raw_base)?;
                    let currency = ISOCurrencyModel::from_str(raw_currency)?;

                    // Build.
                    Ok(SaleOrder {
                        id: sale_order(id),
                        name: raw_name.trim().to_string(),
                        partner_name: raw_partner.trim().to_string(),
                        salesperson: optional(raw_salesperson).map(seller),
                        base_amount: base_amount.into(),
                        currency: currency.into(),
                        lines: Vec::new(),
                        seller_name: String::new(),
                        commission_percent: Decimal::ZERO,
                        commission_amount: Decimal::ZERO,
                    })
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let known = index_ids(orders.iter().map(|o| o.id.as_str()))?;
        let grouped = group_lines(parse_lines(lines_csv)?, &known, |l| SaleOrderLine {
            id: l.line_id,
            product_ref: product(l.product_ref),
            product_name: l.product_name,
            product_type: l.product_type.0,
            quantity: l.quantity,
            mechanic: l.mechanic.map(mechanic),
            line_base_amount: l.line_base_amount,
        })?;
        for (order, lines) in orders.iter_mut().zip(grouped) {
            order.lines = lines;
        }
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use iso_currency::Currency;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::entities::{DocumentStatus, PaymentStatus, ProductType};

    const INVOICES: &str = "\
id,name,partner,status,payment_status,date,salesperson,base_amount,currency
1,INV/001,Taller Norte,posted,paid,2024-03-15,ana,\"1,000.00\",MXN
2,,Cliente Sur,draft,not_paid,2024-03-20,,250.50,mxn
";

    const LINES: &str = "\
invoice_id,line_id,product_ref,product_name,product_type,quantity,mechanic,line_base_amount
1,1a,tune,Tune-up,service,3,luis,900
1,1b,oil,Oil,consu,1,,100
2,2a,tune,Tune-up,service,(1),luis,-300
";

    #[test]
    fn test_invoices_with_lines() {
        let docs = DocumentsCsvDatasourceImpl
            .invoices_from_string(INVOICES, LINES)
            .unwrap();
        assert_eq!(docs.len(), 2);

        let first = &docs[0];
        assert_eq!(first.id, invoice("1"));
        assert_eq!(first.status, DocumentStatus::Posted);
        assert_eq!(first.payment_status, PaymentStatus::Paid);
        assert_eq!(first.salesperson, Some(seller("ana")));
        assert_eq!(first.base_amount, dec!(1000));
        assert_eq!(first.currency, Currency::MXN);
        assert_eq!(first.lines.len(), 2);
        assert_eq!(first.lines[0].mechanic, Some(mechanic("luis")));
        assert_eq!(first.lines[1].product_type, ProductType::Consumable);
        assert_eq!(first.lines[1].mechanic, None);

        let second = &docs[1];
        assert_eq!(second.display_name(), "2");
        assert_eq!(second.salesperson, None);
        assert_eq!(second.lines[0].quantity, dec!(-1));
    }

    #[test]
    fn test_orphan_line_is_rejected() {
        let lines = "invoice_id,line_id,product_ref,product_name,product_type,quantity,mechanic,line_base_amount\n9,9a,tune,Tune-up,service,1,luis,10\n";
        assert!(DocumentsCsvDatasourceImpl
            .invoices_from_string(INVOICES, lines)
            .is_err());
    }

    #[test]
    fn test_duplicate_document_is_rejected() {
        let invoices = "id,name,partner,status,payment_status,date,salesperson,base_amount,currency\n1,A,P,posted,paid,2024-01-01,,1,USD\n1,B,P,posted,paid,2024-01-02,,1,USD\n";
        assert!(DocumentsCsvDatasourceImpl
            .invoices_from_string(invoices, "invoice_id,line_id\n")
            .is_err());
    }

    #[test]
    fn test_duplicate_line_is_rejected() {
        let lines = "invoice_id,line_id,product_ref,product_name,product_type,quantity,mechanic,line_base_amount\n1,1a,tune,Tune-up,service,1,luis,10\n1,1a,tune,Tune-up,service,2,luis,20\n";
        assert!(DocumentsCsvDatasourceImpl
            .invoices_from_string(INVOICES, lines)
            .is_err());

        // The same line id under another document is fine.
        let lines = "invoice_id,line_id,product_ref,product_name,product_type,quantity,mechanic,line_base_amount\n1,a,tune,Tune-up,service,1,luis,10\n2,a,tune,Tune-up,service,2,luis,20\n";
        assert!(DocumentsCsvDatasourceImpl
            .invoices_from_string(INVOICES, lines)
            .is_ok());

        let orders = "id,name,partner,salesperson,base_amount,currency\nS1,SO001,Taller Norte,ana,500,MXN\n";
        let order_lines = "order_id,line_id,product_ref,product_name,product_type,quantity,mechanic,line_base_amount\nS1,l1,tune,Tune-up,service,1,,300\nS1,l1,oil,Oil,product,2,,200\n";
        assert!(DocumentsCsvDatasourceImpl
            .sale_orders_from_string(orders, order_lines)
            .is_err());
    }

    #[test]
    fn test_bad_cells_are_rejected() {
        let bad_date = "id,name,partner,status,payment_status,date,salesperson,base_amount,currency\n1,A,P,posted,paid,15/03/2024,,1,USD\n";
        let bad_status = "id,name,partner,status,payment_status,date,salesperson,base_amount,currency\n1,A,P,sent,paid,2024-03-15,,1,USD\n";
        assert!(DocumentsCsvDatasourceImpl
            .invoices_from_string(bad_date, "invoice_id\n")
            .is_err());
        assert!(DocumentsCsvDatasourceImpl
            .invoices_from_string(bad_status, "invoice_id\n")
            .is_err());
    }

    #[test]
    fn test_sale_orders_with_lines() {
        let orders = "id,name,partner,salesperson,base_amount,currency\nS1,SO001,Taller Norte,ana,500,MXN\n";
        let lines = "order_id,line_id,product_ref,product_name,product_type,quantity,mechanic,line_base_amount\nS1,l1,tune,Tune-up,service,1,,300\nS1,l2,oil,Oil,product,2,,200\n";
        let orders = DocumentsCsvDatasourceImpl
            .sale_orders_from_string(orders, lines)
            .unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].lines.len(), 2);
        assert_eq!(orders[0].service_lines_missing_mechanic().len(), 1);
    }
}
