//! Prompt template for invoice field extraction.

use crate::types::{CEP_KEY, CNPJ_KEY, ISSUE_DATE_KEY, TOTAL_VALUE_KEY};

/// Build the fixed extraction instruction.
///
/// Names the four target fields, their expected textual formats, and the
/// exact JSON keys the reply parser reads.
pub fn extraction_prompt() -> String {
    format!(
        "Analise o conteúdo fornecido e extraia os seguintes dados em formato JSON:\n\
         - {cnpj} (formato XX.XXX.XXX/XXXX-XX)\n\
         - {cep} (formato XXXXX-XXX)\n\
         - {date} (formato DD/MM/AAAA HH:MM:SS)\n\
         - {total} (formato R$ X,XX)\n\
         Use exatamente as chaves \"{cnpj}\", \"{cep}\", \"{date}\" e \"{total}\", \
         todas com valores do tipo string.\n\
         Retorne apenas o JSON com os dados, usando string vazia para os que não forem encontrados.",
        cnpj = CNPJ_KEY,
        cep = CEP_KEY,
        date = ISSUE_DATE_KEY,
        total = TOTAL_VALUE_KEY,
    )
}
