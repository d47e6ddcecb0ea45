use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use evenly_ledger::{
    ExpenseId, GroupId, Ledger, LedgerCommand, LedgerStore, Money, NetBalance, Percent, SplitSpec,
    UserId, aggregate_balances, simplify_debts,
};

/// Generates valid expense commands for benchmarking.
///
/// Expenses rotate over groups, payers and split kinds:
/// 1. Equal split between every member
/// 2. Shares split (member `n` holds `n` shares)
/// 3. Percentage split (first member 50%, rest share the other 50%)
/// 4. Exact split charging everything to the next member
pub struct ExpenseGenerator {
    next_expense: ExpenseId,
    num_groups: GroupId,
    members: UserId,
    remaining: u64,
}

impl ExpenseGenerator {
    pub fn new(num_groups: GroupId, members: UserId, expenses: u64) -> Self {
        Self {
            next_expense: 1,
            num_groups,
            members,
            remaining: expenses,
        }
    }

    fn split(&self, step: u64, payer: UserId) -> SplitSpec {
        let users = 1..=self.members;
        match step % 4 {
            0 => SplitSpec::Equal(users.collect()),
            1 => SplitSpec::Shares(users.map(|u| (u, u)).collect()),
            2 => {
                let rest = i64::from(self.members - 1).max(1);
                let mut points: Vec<(UserId, Percent)> = users
                    .skip(1)
                    .map(|u| (u, Percent::from_basis_points(5_000 / rest)))
                    .collect();
                let assigned: i64 = points.iter().map(|(_, p)| p.basis_points()).sum();
                points.push((1, Percent::from_basis_points(10_000 - assigned)));
                SplitSpec::Percentage(points)
            }
            _ => SplitSpec::Exact(vec![(payer % self.members + 1, Money::from_minor(1_000))]),
        }
    }
}

impl Iterator for ExpenseGenerator {
    type Item = LedgerCommand;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let expense = self.next_expense;
        self.next_expense += 1;

        let group = (expense % u64::from(self.num_groups)) as GroupId + 1;
        let payer = (expense % u64::from(self.members)) as UserId + 1;

        Some(LedgerCommand::RecordExpense {
            group,
            expense,
            payer,
            total: Money::from_minor(1_000), // 10.00
            split: self.split(expense, payer),
        })
    }
}

/// Interleaves edits and deletes of earlier expenses.
pub struct ExpenseGeneratorWithEdits {
    inner: ExpenseGenerator,
    /// Edit every Nth expense, delete every 2Nth (0 = never)
    edit_every: u64,
    pending: Vec<LedgerCommand>,
}

impl ExpenseGeneratorWithEdits {
    pub fn new(num_groups: GroupId, members: UserId, expenses: u64, edit_every: u64) -> Self {
        Self {
            inner: ExpenseGenerator::new(num_groups, members, expenses),
            edit_every,
            pending: Vec::new(),
        }
    }
}

impl Iterator for ExpenseGeneratorWithEdits {
    type Item = LedgerCommand;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(command) = self.pending.pop() {
            return Some(command);
        }

        let command = self.inner.next()?;
        if let LedgerCommand::RecordExpense {
            group,
            expense,
            payer,
            ..
        } = &command
        {
            if self.edit_every > 0 && expense % self.edit_every == 0 {
                let follow_up = if expense % (2 * self.edit_every) == 0 {
                    LedgerCommand::DeleteExpense { expense: *expense }
                } else {
                    LedgerCommand::EditExpense {
                        group: *group,
                        expense: *expense,
                        payer: *payer,
                        total: Money::from_minor(2_500),
                        split: SplitSpec::Equal(vec![*payer]),
                    }
                };
                self.pending.push(follow_up);
            }
        }

        Some(command)
    }
}

fn populated_ledger(groups: GroupId, members: UserId, expenses: u64) -> Ledger {
    let mut ledger = Ledger::new();
    for command in ExpenseGenerator::new(groups, members, expenses) {
        let _ = ledger.apply(command);
    }
    ledger
}

fn bench_record(c: &mut Criterion) {
    let mut group = c.benchmark_group("record");

    for count in [1_000u64, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let mut ledger = Ledger::new();
                for command in ExpenseGenerator::new(10, 8, count) {
                    let _ = black_box(ledger.apply(command));
                }
                ledger
            });
        });
    }

    group.finish();
}

fn bench_with_edits(c: &mut Criterion) {
    let mut group = c.benchmark_group("with_edits");

    group.bench_function("10k_edit_10pct", |b| {
        b.iter(|| {
            let mut ledger = Ledger::new();
            for command in ExpenseGeneratorWithEdits::new(10, 8, 10_000, 10) {
                let _ = black_box(ledger.apply(command));
            }
            ledger
        });
    });

    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    for members in [4u32, 32, 256] {
        let ledger = populated_ledger(1, members, 10_000);
        let history = ledger.store().read_group_history(1).unwrap().into_owned();

        group.bench_with_input(BenchmarkId::from_parameter(members), &history, |b, history| {
            b.iter(|| black_box(aggregate_balances(1, history).unwrap()));
        });
    }

    group.finish();
}

fn bench_simplify(c: &mut Criterion) {
    let mut group = c.benchmark_group("simplify");

    for users in [10u32, 1_000, 100_000] {
        // Alternate creditors and debtors, closed by the last user.
        let mut balances: Vec<NetBalance> = (1..users)
            .map(|u| NetBalance {
                user_id: u,
                group_id: 1,
                amount: Money::from_minor(if u % 2 == 0 { i64::from(u) } else { -2 * i64::from(u) }),
            })
            .collect();
        let sum: Money = balances.iter().map(|b| b.amount).sum();
        balances.push(NetBalance {
            user_id: users,
            group_id: 1,
            amount: -sum,
        });

        group.bench_with_input(BenchmarkId::from_parameter(users), &balances, |b, balances| {
            b.iter(|| black_box(simplify_debts(balances).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_record,
    bench_with_edits,
    bench_aggregate,
    bench_simplify,
);

criterion_main!(benches);
