/*!

This is the long-form manual for `survey_report` and `surveypdf`.

## Input

The input is a survey export with a header row, one question per row. Two
language variants of the header are accepted, and each field is looked up under
both names on every access:

| Field              | Portuguese (checked first) | English              |
|--------------------|----------------------------|----------------------|
| section            | `Seção`                    | `Section`            |
| question number    | `Número da pergunta`       | `Question Number`    |
| question           | `Pergunta`                 | `Question`           |
| response           | `Opção (s) de resposta`    | `Response Option(s)` |
| reviewers          | `Nomes dos revisores`      | `Reviewer Names`     |

Missing columns are not an error: the field takes its default value (an empty
string, or the no-response placeholder for responses).

The following input types are supported by `surveypdf`:
* `csv` Comma Separated Values (default). The usual spreadsheet spellings of a
  missing value (`NA`, `N/A`, `NaN`, `NULL`, `None`, empty cell, ...) are read as
  absent.
* `excel` The first worksheet (or the one given with `--excel-worksheet-name`)
  of an `.xlsx` workbook. Numbers keep their type and are printed in their
  natural form (`3`, not `3.0`).

## Document structure

The document always has the same shape:

1. a logo at the top of every page (if one is configured)
2. the generation date, in UTC-03:00, formatted `DD/MM/YYYY - HH:MM`
3. the reviewers, read from the first row only
4. for every row, in the order of the file:
   - a centered section title, each time the section differs from the previous row
   - the question, in bold, as `number - question`
   - the response, or `Sem resposta` / `No response` if there is none

Rows are not regrouped by section. A section that appears again after another
one gets a second title.

## Output name

The document is named after the response of the first row, with the characters
`< > : " / \ | ? *` removed, followed by `.pdf`. If the first row has no
response, the name is `output.pdf`.

## Configuration

`surveypdf` accepts a JSON configuration file with the `--config` flag. All the
keys are optional. Paths are relative to the configuration file.

```json
{
  "inputSource": {
    "provider": "csv",
    "filePath": "export.csv",
    "nullMarkers": ["", "NA", "-"]
  },
  "outputSettings": {
    "outputDirectory": "reports",
    "logoPath": "logo.png",
    "language": "pt",
    "documentTitle": "Relatório de revisão"
  },
  "labels": {
    "sectionPrefix": "Sessão: ",
    "noResponse": "Sem resposta"
  },
  "credentials": {
    "reviewer": "change-me"
  }
}
```

`credentials` is required: without it the program refuses to run. `--user` and
`--password` must match one of the entries before any file is read.

*/
