/*!

This is the long-form manual for `feedback_tally` and `nfdash`.

## Input formats

The dashboard reads the export of the nurse feedback survey form:
* `csv` the "Download responses (.csv)" export. The first line holds the questions.
  Empty lines are ignored.
* `xlsx` the spreadsheet export of the same form. The first worksheet is used unless
  `excelWorksheetName` is set in the configuration.

The column `Name and Employee ID` identifies the respondent. A row where this cell is
empty (or only spaces) is skipped. Every other column is optional: a missing question is
recorded as an empty answer.

The questions are matched exactly, as they appear in the form. A few of them end with
spaces in the form itself and must keep them in the export.

## Collections

Each row produces three records, stored in three collections:

| Collection | Store key |
|---|---|
| Technical Feedback | `technical_feedback` |
| Clinic & Work Environment | `clinic_work_environment` |
| Growth & Feedback | `growth_feedback` |

Records from successive uploads are appended. Use `nfdash clear` to start over, or
`nfdash upload --replace` to clear and upload in one step.

## Charts

Each chart counts the answers of one question against a fixed list of categories
(`Yes`/`No`, `Yes`/`No`/`Sometimes` or `Yes`/`No`/`Maybe later`). Answers are compared
without case, after removing surrounding spaces. Answers outside the list are not counted.

The "Clinic Clean & Safe" chart counts `Yes` for a clinic answered as clean and safe,
`No` otherwise.

## Configuration

```json
{
  "storeDirectory": "feedback-store",
  "excelWorksheetName": "Form Responses 1",
  "replaceOnUpload": false,
  "pageSize": 10,
  "outputSettings": {
    "dashboardName": "Nurse Feedback Dashboard",
    "outputPath": "summary.json"
  }
}
```

All the keys are optional.

*/
