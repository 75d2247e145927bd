/*!

This is the long-form manual for `round_tally` and `roundtally`.

## Input tables

The input is a table with one row per contestant and one column per round:

```text
序号,角色,作品,CV,预选赛第一轮,预选赛第二轮,...,累计得票数
1,Anna,Series A,Some Voice,1200,980/35,...,2215
```

The identity columns are the index (`序号`), the name of the contestant (`角色`),
the series (`作品`), the voice credit (`CV`), the cumulative total (`累计得票数`)
and optionally an avatar (`头像`). Only the name and series columns are mandatory.
Every other column is a round column.

Spaces in column labels are ignored: `预选赛 第一轮` and `预选赛第一轮` are the
same column. The columns may come in any order: the rounds are always reported
in the chronological order of the schedule.

The following formats are supported:
* `csv` the first row is the header. A UTF-8 byte order mark is accepted.
* `xlsx` Excel workbook. The first worksheet is read unless a worksheet name
  is given with `--excel-worksheet-name`.

### Votes

A vote cell is read as follows:
- blank cells are absent votes (different from a vote of `0`)
- `12`, `12.5`, `1e3` are numbers, rounded to two decimal places
- `1200/35` is a split vote: all the parts are added (`1235`). Empty parts are
  skipped: `1200/` is `1200`, and `/` is absent.
- `nan`, `inf`, `-infinity` and anything that is not a number are absent.

A malformed cell never stops the processing of the table.

## Seasons

The season is detected from the name of the table: it is the 4-digit year in
front of `_season`, for example `female_2023_season.csv`. When the file was
renamed, the original name can be given with `--name`.

Each season has a schedule:

```json
{
  "seasons": [
    {
      "season": "2023",
      "rounds": [
        { "name": "预选赛第一轮" },
        { "name": "第一阶段第四轮", "wildcard": true,
          "eliminated": [ { "character": "Anna", "series": "Series A" } ] },
        { "name": "淘汰赛第一轮", "bracket": true }
      ]
    }
  ]
}
```

- `wildcard` rounds can be left out of the results with `--exclude-wildcard`.
- `bracket` rounds are knockout rounds: their tally is the elimination itself.
- `eliminated` lists the contestants eliminated exactly in this round. A
  contestant may be eliminated at most once per season.

A season is defined once: adding a season means adding a new entry. The
schedule of the 2023 season is built in and used when no `--schedule` file is
given.

## Results

For each round, `roundtally` reports the votes of every contestant and the number
of contestants still active when entering the round.

With `--exclude-ranking`, the votes of a contestant stop at their elimination.
In a knockout round, the vote of the eliminating round is kept since it is the
elimination itself. In a regular round, it is dropped as well.

Leaving rounds out of the results with `--exclude` or `--exclude-wildcard`
does not change the eliminations nor the headcounts of the other rounds: they
are always computed over the complete schedule.

`--list-rounds` only prints the rounds of the season, along with the columns of
the table that are not part of the schedule. `--list-contestants` prints each
contestant with its series (`ip`) and avatar, in the order of the table.

 */
