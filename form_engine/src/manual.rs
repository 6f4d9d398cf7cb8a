/*!

This is the long-form manual for `form_engine` and `zooform`.

## The parameter sheet

A form is described by one worksheet (by default `input_vals`). The table
occupies the columns `E` to `U`: the first row holds the column names, every
following row describes one field, in the order the fields are presented.
The first column of the table is the field id.

| column           | meaning                                                         |
|------------------|-----------------------------------------------------------------|
| (first column)   | unique field id                                                 |
| `input_group_id` | fields sharing this id are switched off together                |
| `chkbox_before`  | whether a checkbox precedes the field                           |
| `chkbox_label`   | label of that checkbox (required when `chkbox_before` is set)   |
| `chkbox_value`   | initial state of the checkbox                                   |
| `header_before`  | whether a section header precedes the field                     |
| `header_label`   | text of the header (required when `header_before` is set)       |
| `format_spec`    | `%d`, `%.1f`, `%.2f` or `%s`                                    |
| `min_value`      | lower bound                                                     |
| `max_value`      | upper bound                                                     |
| `default_value`  | initial value                                                   |
| `step`           | increment                                                       |
| `desc_label`     | the question shown to the user                                  |
| `st_key`         | unique widget key                                               |
| `st_widget`      | `slider`, `number_input` or `radio`                             |
| `attr`           | category the value is added to (`lovability`, `scariness`, ...) |
| `cls_or_instnc`  | entity used to colour the chart                                 |

Flags accept booleans, `0`/`1`, `true`/`false` and `yes`/`no`. An empty flag
is false. Completely empty rows are ignored.

### Formats

The format decides how the bounds, default and step are read:
* `%d` integers (decimals are truncated)
* `%.1f`, `%.2f` floating point numbers
* `%s` text
* anything else: floating point numbers

The value entered by the user is kept as the widget returned it.

### Groups

The rows are visited in order. A row is active when its checkbox (if it has
one) is checked and the previous row, if it belongs to the same group, is
active. Unchecking the checkbox of the first row of a group therefore
switches off the whole group, whatever the checkboxes of the following rows
say. Inactive rows count as zero.

Only the immediately preceding row is looked at. If rows of one group are
separated by a row of another group, the group starts over.

## Radio widgets

A radio offers the values from `min_value` to `max_value` by `step`. For text
formats, or when the range is empty, the default value is the only choice.

## Totals and chart

The values of all the rows sharing an `attr` are added up. Integer sums stay
integers, sums involving decimals are decimals, text values are ignored. An
integer sum too large for 64 bits becomes a decimal.

The chart stacks, for each `attr`, the values of every `cls_or_instnc`.

## Running `zooform`

```bash
# Accept every default value.
zooform --schema parms.xlsx

# Answer interactively in the terminal.
zooform --schema parms.xlsx --interactive

# Replay answers and write a summary.
zooform --schema parms.xlsx --answers answers.json --out summary.json --show-chart
```

The answers file maps checkbox labels and widget keys to values:

```json
{
  "checkboxes": { "Do you have lions?": true },
  "values": { "101": 3, "102": 0.5 }
}
```

A run configuration groups the same options in one JSON file, passed with
`--config`. Paths in it are relative to the configuration file:

```json
{
  "title": "Home Zoo Assessor",
  "schemaFile": "parms.xlsx",
  "worksheetName": "input_vals",
  "columns": "E:U",
  "answersFile": "answers.json",
  "totals": ["lovability", "scariness", "ferocity"],
  "outputFile": "summary.json"
}
```

*/
