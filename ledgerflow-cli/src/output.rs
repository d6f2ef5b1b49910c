use ledgerflow_finance::Summary;

pub fn print_summary(summary: &Summary, top: usize) {
    println!("每月开支:");
    for (month, amount) in &summary.monthly {
        println!("  {month}  {amount:>12.2}");
    }
    println!("  {:<7}  {:>12.2}", "total", summary.total());

    println!("\n不同分类的开支:");
    for (category, amount) in summary.spending_categories() {
        println!("  {:<12} {:>12.2}", category, amount);
    }

    if top > 0 {
        println!("\nTop {} counterparties:", top);
        for (name, amount) in summary.top_counterparties(top) {
            println!("  {:<20} {:>12.2}", name, amount);
        }
    }
}
